use super::controller::ws_post_comments;
use actix_web::web;

pub fn subscription_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ws").route("/posts/{post_id}/comments", web::get().to(ws_post_comments)),
    );
}
