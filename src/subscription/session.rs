use actix::{Actor, ActorContext, AsyncContext, StreamHandler};
use actix_web_actors::ws;
use std::time::{Duration, Instant};

use crate::comment::model::Comment;
use crate::subscription::hub::Subscription;
use crate::subscription::model::{ClientMessage, ServerMessage};

/// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
/// How long before lack of client response causes a timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// WebSocket session streaming one post's new comments to a client.
///
/// The hub subscription is attached to the actor as a stream, so it is
/// dropped (and deregistered) when the actor stops for any reason.
pub struct CommentFeedSession {
    post_id: String,
    subscription: Option<Subscription>,
    last_heartbeat: Instant,
}

impl CommentFeedSession {
    pub fn new(subscription: Subscription) -> Self {
        CommentFeedSession {
            post_id: subscription.post_id().to_string(),
            subscription: Some(subscription),
            last_heartbeat: Instant::now(),
        }
    }

    /// Start heartbeat process
    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > CLIENT_TIMEOUT {
                log::warn!(
                    "Comment feed for post {} timed out, disconnecting",
                    act.post_id
                );
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn send_message(&self, msg: &ServerMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match serde_json::to_string(msg) {
            Ok(json) => ctx.text(json),
            Err(e) => log::error!("Failed to serialize feed message: {}", e),
        }
    }
}

impl Actor for CommentFeedSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.start_heartbeat(ctx);

        if let Some(subscription) = self.subscription.take() {
            let confirmation = ServerMessage::Subscribed {
                post_id: subscription.post_id().to_string(),
                subscription_id: subscription.id().to_string(),
            };
            ctx.add_stream(subscription);
            self.send_message(&confirmation, ctx);
        }
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        log::info!("Comment feed for post {} closed", self.post_id);
    }
}

/// Comments delivered by the hub
impl StreamHandler<Comment> for CommentFeedSession {
    fn handle(&mut self, comment: Comment, ctx: &mut Self::Context) {
        self.send_message(&ServerMessage::CommentAdded { comment }, ctx);
    }

    fn finished(&mut self, ctx: &mut Self::Context) {
        ctx.stop();
    }
}

/// Handler for WebSocket messages
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for CommentFeedSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Ping) => self.send_message(&ServerMessage::Pong, ctx),
                    Err(e) => {
                        log::warn!("Failed to parse WebSocket message: {}", e);
                        self.send_message(
                            &ServerMessage::Error {
                                message: format!("Invalid message format: {}", e),
                            },
                            ctx,
                        );
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                log::warn!("Binary messages not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                log::info!("WebSocket close: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            _ => ctx.stop(),
        }
    }
}
