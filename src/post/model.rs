use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::comment::model::Comment;

/// A top-level content item. Only `comments_allowed` changes after creation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub comments_allowed: bool,
    pub created_at: DateTime<Utc>,
}

/// A post together with the newest page of its comments.
#[derive(Debug, Serialize)]
pub struct PostWithComments {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(default = "default_comments_allowed")]
    pub comments_allowed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub comments_allowed: bool,
}

fn default_comments_allowed() -> bool {
    true
}
