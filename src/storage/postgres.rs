use std::time::Duration;

use async_trait::async_trait;
use log::info;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::ContentStore;
use crate::comment::model::Comment;
use crate::post::model::Post;
use crate::utils::error::CustomError;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Relational backend. Concurrency control is left to Postgres; each method
/// is a single statement.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Open a pool, check connectivity and apply pending migrations.
    pub async fn connect(dsn: &str, max_connections: u32) -> Result<Self, CustomError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .connect(dsn)
            .await
            .map_err(|e| CustomError::StorageUnavailableError(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| CustomError::StorageUnavailableError(format!("Migration failed: {}", e)))?;

        info!("Connected successfully to PostgreSQL");

        Ok(Self { pool })
    }

    async fn post_exists(&self, id: &str) -> Result<bool, CustomError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl ContentStore for PostgresStore {
    async fn create_post(&self, post: Post) -> Result<Post, CustomError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, title, content, author, comments_allowed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.comments_allowed)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(post)
    }

    async fn get_post(&self, id: &str) -> Result<Post, CustomError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, author, comments_allowed, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CustomError::NotFoundError(format!("Post {} not found", id)))
    }

    async fn list_posts(&self) -> Result<Vec<Post>, CustomError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, author, comments_allowed, created_at
            FROM posts
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn update_post(&self, post: Post) -> Result<Post, CustomError> {
        sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts SET comments_allowed = $1
            WHERE id = $2
            RETURNING id, title, content, author, comments_allowed, created_at
            "#,
        )
        .bind(post.comments_allowed)
        .bind(&post.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CustomError::NotFoundError(format!("Post {} not found", post.id)))
    }

    async fn create_comment(&self, comment: Comment) -> Result<Comment, CustomError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, parent_id, content, author, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.post_id)
        .bind(&comment.parent_id)
        .bind(&comment.content)
        .bind(&comment.author)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn list_comments(
        &self,
        post_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Comment>, CustomError> {
        if !self.post_exists(post_id).await? {
            return Err(CustomError::NotFoundError(format!(
                "No comments found for post {}",
                post_id
            )));
        }

        // LIMIT NULL is "no limit" in Postgres
        let limit = (limit > 0).then(|| i64::try_from(limit).unwrap_or(i64::MAX));
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, parent_id, author, content, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at DESC, seq DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(post_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::helpers::now;
    use uuid::Uuid;

    /// Postgres tests need a live database; they are skipped unless
    /// `TEST_POSTGRES_DSN` points at one.
    async fn test_store() -> Option<PostgresStore> {
        let dsn = match std::env::var("TEST_POSTGRES_DSN") {
            Ok(dsn) => dsn,
            Err(_) => {
                eprintln!("Skipping test: TEST_POSTGRES_DSN not set");
                return None;
            }
        };
        Some(PostgresStore::connect(&dsn, 2).await.unwrap())
    }

    fn post(comments_allowed: bool) -> Post {
        Post {
            id: Uuid::new_v4().to_string(),
            title: "T".to_string(),
            content: "C".to_string(),
            author: "A".to_string(),
            comments_allowed,
            created_at: now(),
        }
    }

    #[tokio::test]
    async fn post_round_trip_and_conflict() {
        let Some(store) = test_store().await else {
            return;
        };

        let created = store.create_post(post(true)).await.unwrap();
        assert_eq!(store.get_post(&created.id).await.unwrap(), created);
        assert!(matches!(
            store.create_post(created.clone()).await,
            Err(CustomError::ConflictError(_))
        ));

        let mut change = created.clone();
        change.comments_allowed = false;
        assert!(!store.update_post(change).await.unwrap().comments_allowed);
    }

    #[tokio::test]
    async fn comment_pages_are_newest_first() {
        let Some(store) = test_store().await else {
            return;
        };

        let post = store.create_post(post(true)).await.unwrap();
        assert!(store.list_comments(&post.id, 10, 0).await.unwrap().is_empty());

        for i in 0..5 {
            store
                .create_comment(Comment {
                    id: Uuid::new_v4().to_string(),
                    post_id: post.id.clone(),
                    parent_id: None,
                    author: "U".to_string(),
                    content: format!("comment {}", i),
                    created_at: now() + chrono::Duration::milliseconds(i),
                })
                .await
                .unwrap();
        }

        let first = store.list_comments(&post.id, 2, 0).await.unwrap();
        assert_eq!(first[0].content, "comment 4");
        assert_eq!(store.list_comments(&post.id, 2, 4).await.unwrap().len(), 1);
        assert_eq!(store.list_comments(&post.id, 0, 0).await.unwrap().len(), 5);
        assert!(matches!(
            store.list_comments("ghost", 10, 0).await,
            Err(CustomError::NotFoundError(_))
        ));
    }

    #[tokio::test]
    async fn equal_timestamps_page_in_a_stable_order() {
        let Some(store) = test_store().await else {
            return;
        };

        let post = store.create_post(post(true)).await.unwrap();
        let stamp = now();
        for i in 0..5 {
            store
                .create_comment(Comment {
                    id: Uuid::new_v4().to_string(),
                    post_id: post.id.clone(),
                    parent_id: None,
                    author: "U".to_string(),
                    content: format!("comment {}", i),
                    created_at: stamp,
                })
                .await
                .unwrap();
        }

        let all = store.list_comments(&post.id, 0, 0).await.unwrap();
        assert_eq!(all[0].content, "comment 4");
        assert_eq!(all[4].content, "comment 0");

        let mut paged = Vec::new();
        for offset in [0, 2, 4] {
            paged.extend(store.list_comments(&post.id, 2, offset).await.unwrap());
        }
        assert_eq!(paged, all);
        assert_eq!(store.list_comments(&post.id, 0, 0).await.unwrap(), all);
    }
}
