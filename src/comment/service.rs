use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use crate::comment::model::Comment;
use crate::storage::ContentStore;
use crate::subscription::hub::{NotificationHub, Subscription};
use crate::utils::error::CustomError;
use crate::utils::helpers::now;

/// Longest accepted comment, in characters.
pub const MAX_COMMENT_LENGTH: usize = 2000;

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn ContentStore>,
    hub: NotificationHub,
}

impl CommentService {
    pub fn new(store: Arc<dyn ContentStore>, hub: NotificationHub) -> Self {
        CommentService { store, hub }
    }

    /// Add a comment to a post and push it to the post's live subscribers.
    ///
    /// Checks run in a fixed order: the post must exist, must allow comments,
    /// and the content must fit in [`MAX_COMMENT_LENGTH`] characters.
    pub async fn add_comment(
        &self,
        post_id: &str,
        parent_id: Option<String>,
        author: String,
        content: String,
    ) -> Result<Comment, CustomError> {
        let post = match self.store.get_post(post_id).await {
            Ok(post) => post,
            Err(CustomError::NotFoundError(_)) => {
                return Err(CustomError::PostNotFoundError(post_id.to_string()));
            }
            Err(e) => return Err(e),
        };

        if !post.comments_allowed {
            return Err(CustomError::CommentsDisabledError(post.id));
        }

        let length = content.chars().count();
        if length > MAX_COMMENT_LENGTH {
            return Err(CustomError::ContentTooLongError(length));
        }

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            post_id: post.id,
            parent_id,
            author,
            content,
            created_at: now(),
        };

        let comment = self.store.create_comment(comment).await?;
        let delivered = self.hub.publish(&comment.post_id, &comment).await;
        debug!(
            "Comment {} stored for post {} ({} live subscriber(s))",
            comment.id, comment.post_id, delivered
        );

        Ok(comment)
    }

    /// Newest-first page of a post's comments. `limit == 0` returns everything
    /// after `offset`.
    pub async fn get_comments_for_post(
        &self,
        post_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Comment>, CustomError> {
        self.store.list_comments(post_id, limit, offset).await
    }

    /// Start watching an existing post for new comments.
    pub async fn subscribe(&self, post_id: &str) -> Result<Subscription, CustomError> {
        match self.store.get_post(post_id).await {
            Ok(post) => Ok(self.hub.subscribe(&post.id)),
            Err(CustomError::NotFoundError(_)) => {
                Err(CustomError::PostNotFoundError(post_id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Number of live feeds currently open on `post_id`.
    pub fn live_subscribers(&self, post_id: &str) -> usize {
        self.hub.subscriber_count(post_id)
    }
}
