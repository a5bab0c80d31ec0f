use super::controller::{create_post, get_post, get_posts, update_post};
use actix_web::web;

pub fn post_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .route("", web::post().to(create_post))
            .route("", web::get().to(get_posts))
            .route("/{id}", web::get().to(get_post))
            .route("/{id}", web::patch().to(update_post)),
    );
}
