use crate::comment::model::{CommentPageQuery, CreateCommentRequest};
use crate::comment::service::CommentService;
use crate::utils::error::CustomError;
use crate::utils::helpers::service_name;
use actix_web::{HttpResponse, web};
use serde_json::json;

/// Create a new comment on a post
/// POST /comments
pub async fn create_comment(
    comment_service: web::Data<CommentService>,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let body = body.into_inner();
    let comment = comment_service
        .add_comment(&body.post_id, body.parent_id, body.author, body.content)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Comment created successfully",
        "httpStatusCode": 201,
        "service": service_name(),
        "data": comment
    })))
}

/// Get a page of comments for a post, newest first
/// GET /comments/post/{post_id}?limit=&offset=
pub async fn get_post_comments(
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
    query: web::Query<CommentPageQuery>,
) -> Result<HttpResponse, CustomError> {
    let comments = comment_service
        .get_comments_for_post(&path.into_inner(), query.limit, query.offset)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comments retrieved successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "count": comments.len(),
        "limit": query.limit,
        "offset": query.offset,
        "data": comments
    })))
}
