use crate::post::model::{CreatePostRequest, UpdatePostRequest};
use crate::post::service::PostService;
use crate::utils::error::CustomError;
use crate::utils::helpers::service_name;
use actix_web::{HttpResponse, web};
use serde_json::json;

/// Create a new post
/// POST /posts
pub async fn create_post(
    post_service: web::Data<PostService>,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, CustomError> {
    let body = body.into_inner();
    let post = post_service
        .create_post(body.title, body.content, body.author, body.comments_allowed)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Post created successfully",
        "httpStatusCode": 201,
        "service": service_name(),
        "data": post
    })))
}

/// List all posts
/// GET /posts
pub async fn get_posts(post_service: web::Data<PostService>) -> Result<HttpResponse, CustomError> {
    let posts = post_service.list_posts().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Posts retrieved successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "count": posts.len(),
        "data": posts
    })))
}

/// Get a post with its newest comments
/// GET /posts/{id}
pub async fn get_post(
    post_service: web::Data<PostService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service.get_post_with_comments(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "data": post
    })))
}

/// Allow or forbid comments on a post
/// PATCH /posts/{id}
pub async fn update_post(
    post_service: web::Data<PostService>,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service
        .set_comments_allowed(&path.into_inner(), body.comments_allowed)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post updated successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "data": post
    })))
}
