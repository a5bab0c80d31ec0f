use serde::{Deserialize, Serialize};

use crate::comment::model::Comment;

/// WebSocket message from client
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ping to keep connection alive
    Ping,
}

/// WebSocket message to client
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Subscription registered
    Subscribed {
        post_id: String,
        subscription_id: String,
    },
    /// A new comment was created on the watched post
    CommentAdded { comment: Comment },
    /// Error message
    Error { message: String },
    /// Pong response
    Pong,
}
