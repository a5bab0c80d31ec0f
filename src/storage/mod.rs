pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info};

use crate::comment::model::Comment;
use crate::config::{Config, StorageKind};
use crate::post::model::Post;
use crate::utils::error::CustomError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Storage contract shared by the in-memory and Postgres backends.
///
/// Every call is atomic from the caller's point of view. Failures are
/// surfaced immediately; nothing here retries.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Insert a post. Fails with `ConflictError` if the id is already taken.
    async fn create_post(&self, post: Post) -> Result<Post, CustomError>;

    async fn get_post(&self, id: &str) -> Result<Post, CustomError>;

    /// All posts, in no particular order.
    async fn list_posts(&self) -> Result<Vec<Post>, CustomError>;

    /// Replace the mutable fields (`comments_allowed`) of a stored post.
    async fn update_post(&self, post: Post) -> Result<Post, CustomError>;

    /// Append a comment to its post. The caller has already checked that the
    /// post exists.
    async fn create_comment(&self, comment: Comment) -> Result<Comment, CustomError>;

    /// A page of a post's comments, newest first. `limit == 0` means no limit.
    /// Fails with `NotFoundError` for an unknown post; an offset past the end
    /// yields an empty page.
    async fn list_comments(
        &self,
        post_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Comment>, CustomError>;
}

/// Build the store selected by configuration. A Postgres connection failure
/// is returned to the caller, which treats it as fatal.
pub async fn init_storage(config: &Config) -> Result<Arc<dyn ContentStore>, CustomError> {
    match config.storage_kind {
        StorageKind::Memory => {
            info!("Using in-memory storage");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageKind::Postgres => {
            let dsn = config.postgres_dsn.as_deref().ok_or_else(|| {
                CustomError::StorageUnavailableError("POSTGRES_DSN is not set".to_string())
            })?;
            let store = PostgresStore::connect(dsn, config.db_max_connections)
                .await
                .inspect_err(|e| error!("Failed to connect to PostgreSQL: {}", e))?;
            info!("Using PostgreSQL storage");
            Ok(Arc::new(store))
        }
    }
}
