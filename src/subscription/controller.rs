use actix_web::{HttpRequest, HttpResponse, web};
use actix_web_actors::ws;

use crate::comment::service::CommentService;
use crate::subscription::session::CommentFeedSession;

/// Live feed of new comments on a post
/// GET /ws/posts/{post_id}/comments
pub async fn ws_post_comments(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<String>,
    comment_service: web::Data<CommentService>,
) -> Result<HttpResponse, actix_web::Error> {
    let post_id = path.into_inner();
    let subscription = comment_service.subscribe(&post_id).await?;

    log::info!(
        "WebSocket comment feed requested for post {} ({}), {} live feed(s)",
        post_id,
        subscription.id(),
        comment_service.live_subscribers(&post_id)
    );

    // on handshake failure the session is dropped, and the subscription with it
    ws::start(CommentFeedSession::new(subscription), &req, stream)
}
