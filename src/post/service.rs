use std::sync::Arc;

use uuid::Uuid;

use crate::post::model::{Post, PostWithComments};
use crate::storage::ContentStore;
use crate::utils::error::CustomError;
use crate::utils::helpers::now;

/// How many comments accompany a single post lookup.
pub const POST_COMMENT_PREVIEW: usize = 10;

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn ContentStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        PostService { store }
    }

    pub async fn create_post(
        &self,
        title: String,
        content: String,
        author: String,
        comments_allowed: bool,
    ) -> Result<Post, CustomError> {
        let post = Post {
            id: Uuid::new_v4().to_string(),
            title,
            content,
            author,
            comments_allowed,
            created_at: now(),
        };

        self.store.create_post(post).await
    }

    /// The post plus its newest comments.
    pub async fn get_post_with_comments(&self, id: &str) -> Result<PostWithComments, CustomError> {
        let post = self.store.get_post(id).await?;
        let comments = self
            .store
            .list_comments(id, POST_COMMENT_PREVIEW, 0)
            .await?;
        Ok(PostWithComments { post, comments })
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, CustomError> {
        self.store.list_posts().await
    }

    /// Open or close a post for new comments.
    pub async fn set_comments_allowed(&self, id: &str, allowed: bool) -> Result<Post, CustomError> {
        let mut post = self.store.get_post(id).await?;
        post.comments_allowed = allowed;
        self.store.update_post(post).await
    }
}
