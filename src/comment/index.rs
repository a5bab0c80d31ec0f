use super::controller::{create_comment, get_post_comments};
use actix_web::web;

pub fn comment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/comments")
            .route("", web::post().to(create_comment))
            .route("/post/{post_id}", web::get().to(get_post_comments)),
    );
}
