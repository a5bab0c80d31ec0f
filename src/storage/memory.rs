use std::collections::{HashMap, HashSet};
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ContentStore;
use crate::comment::model::Comment;
use crate::post::model::Post;
use crate::utils::error::CustomError;

#[derive(Default)]
struct Tables {
    posts: HashMap<String, Post>,
    /// post id -> comments in insertion order
    comments: HashMap<String, Vec<Comment>>,
    comment_ids: HashSet<String>,
}

/// Process-memory backend. All tables sit behind one reader-writer lock:
/// reads share it, every write is exclusive.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest-first window over comments stored oldest-first.
fn page(comments: &[Comment], limit: usize, offset: usize) -> Vec<Comment> {
    let take = if limit == 0 { usize::MAX } else { limit };
    comments
        .iter()
        .rev()
        .skip(offset)
        .take(take)
        .cloned()
        .collect()
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn create_post(&self, post: Post) -> Result<Post, CustomError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        match tables.posts.entry(post.id.clone()) {
            Entry::Occupied(_) => Err(CustomError::ConflictError(format!(
                "Post {} already exists",
                post.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(post.clone());
                tables.comments.entry(post.id.clone()).or_default();
                Ok(post)
            }
        }
    }

    async fn get_post(&self, id: &str) -> Result<Post, CustomError> {
        let tables = self.tables.read().await;
        tables
            .posts
            .get(id)
            .cloned()
            .ok_or_else(|| CustomError::NotFoundError(format!("Post {} not found", id)))
    }

    async fn list_posts(&self) -> Result<Vec<Post>, CustomError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.values().cloned().collect())
    }

    async fn update_post(&self, post: Post) -> Result<Post, CustomError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .posts
            .get_mut(&post.id)
            .ok_or_else(|| CustomError::NotFoundError(format!("Post {} not found", post.id)))?;
        stored.comments_allowed = post.comments_allowed;
        Ok(stored.clone())
    }

    async fn create_comment(&self, mut comment: Comment) -> Result<Comment, CustomError> {
        let mut tables = self.tables.write().await;
        if !tables.comment_ids.insert(comment.id.clone()) {
            return Err(CustomError::ConflictError(format!(
                "Comment {} already exists",
                comment.id
            )));
        }
        let thread = tables.comments.entry(comment.post_id.clone()).or_default();
        // keep created_at non-decreasing so insertion order is (created_at, seq) order
        if let Some(last) = thread.last() {
            comment.created_at = comment.created_at.max(last.created_at);
        }
        thread.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(
        &self,
        post_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Comment>, CustomError> {
        let tables = self.tables.read().await;
        let comments = tables.comments.get(post_id).ok_or_else(|| {
            CustomError::NotFoundError(format!("No comments found for post {}", post_id))
        })?;
        Ok(page(comments, limit, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::helpers::now;
    use std::sync::Arc;

    fn post(id: &str, comments_allowed: bool) -> Post {
        Post {
            id: id.to_string(),
            title: "T".to_string(),
            content: "C".to_string(),
            author: "A".to_string(),
            comments_allowed,
            created_at: now(),
        }
    }

    fn comment(id: &str, post_id: &str) -> Comment {
        Comment {
            id: id.to_string(),
            post_id: post_id.to_string(),
            parent_id: None,
            author: "U".to_string(),
            content: format!("comment {}", id),
            created_at: now(),
        }
    }

    async fn store_with_comments(count: usize) -> MemoryStore {
        let store = MemoryStore::new();
        store.create_post(post("p1", true)).await.unwrap();
        for i in 0..count {
            store
                .create_comment(comment(&format!("c{}", i), "p1"))
                .await
                .unwrap();
        }
        store
    }

    fn ids(comments: &[Comment]) -> Vec<&str> {
        comments.iter().map(|c| c.id.as_str()).collect()
    }

    #[tokio::test]
    async fn create_and_get_post() {
        let store = MemoryStore::new();
        let created = store.create_post(post("p1", true)).await.unwrap();
        assert_eq!(store.get_post("p1").await.unwrap(), created);
        assert!(matches!(
            store.get_post("missing").await,
            Err(CustomError::NotFoundError(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_ids_conflict() {
        let store = MemoryStore::new();
        store.create_post(post("p1", true)).await.unwrap();
        assert!(matches!(
            store.create_post(post("p1", false)).await,
            Err(CustomError::ConflictError(_))
        ));
        // the original post is untouched
        assert!(store.get_post("p1").await.unwrap().comments_allowed);

        store.create_comment(comment("c1", "p1")).await.unwrap();
        assert!(matches!(
            store.create_comment(comment("c1", "p1")).await,
            Err(CustomError::ConflictError(_))
        ));
        assert_eq!(store.list_comments("p1", 0, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_post_only_touches_comments_allowed() {
        let store = MemoryStore::new();
        store.create_post(post("p1", true)).await.unwrap();

        let mut change = post("p1", false);
        change.title = "ignored".to_string();
        let updated = store.update_post(change).await.unwrap();
        assert!(!updated.comments_allowed);
        assert_eq!(updated.title, "T");

        assert!(matches!(
            store.update_post(post("nope", false)).await,
            Err(CustomError::NotFoundError(_))
        ));
    }

    #[tokio::test]
    async fn list_posts_returns_everything() {
        let store = MemoryStore::new();
        for id in ["a", "b", "c"] {
            store.create_post(post(id, true)).await.unwrap();
        }
        let mut listed: Vec<String> = store
            .list_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        listed.sort();
        assert_eq!(listed, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn comments_are_listed_newest_first() {
        let store = store_with_comments(3).await;
        let all = store.list_comments("p1", 0, 0).await.unwrap();
        assert_eq!(ids(&all), vec!["c2", "c1", "c0"]);
    }

    #[tokio::test]
    async fn pages_cover_every_comment_once() {
        let store = store_with_comments(5).await;

        let mut collected = Vec::new();
        let mut offset = 0;
        loop {
            let page = store.list_comments("p1", 2, offset).await.unwrap();
            if page.is_empty() {
                break;
            }
            collected.extend(page);
            offset += 2;
        }

        let all = store.list_comments("p1", 0, 0).await.unwrap();
        assert_eq!(collected, all);
        assert_eq!(ids(&collected), vec!["c4", "c3", "c2", "c1", "c0"]);
    }

    #[tokio::test]
    async fn page_sizes_and_idempotence() {
        let store = store_with_comments(5).await;
        assert_eq!(store.list_comments("p1", 2, 0).await.unwrap().len(), 2);
        assert_eq!(store.list_comments("p1", 2, 2).await.unwrap().len(), 2);
        assert_eq!(store.list_comments("p1", 2, 4).await.unwrap().len(), 1);
        assert!(store.list_comments("p1", 2, 6).await.unwrap().is_empty());
        assert_eq!(store.list_comments("p1", 0, 3).await.unwrap().len(), 2);

        let first = store.list_comments("p1", 3, 1).await.unwrap();
        let second = store.list_comments("p1", 3, 1).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn late_stamped_comment_keeps_listing_order() {
        let store = store_with_comments(0).await;

        let mut later = comment("later", "p1");
        later.created_at = now() + chrono::Duration::seconds(60);
        let later = store.create_comment(later).await.unwrap();

        // written second but stamped earlier
        let mut earlier = comment("earlier", "p1");
        earlier.created_at = later.created_at - chrono::Duration::seconds(30);
        let earlier = store.create_comment(earlier).await.unwrap();
        assert_eq!(earlier.created_at, later.created_at);

        let all = store.list_comments("p1", 0, 0).await.unwrap();
        assert_eq!(ids(&all), vec!["earlier", "later"]);
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn unknown_post_is_not_found_but_empty_post_is_empty() {
        let store = store_with_comments(0).await;
        assert!(store.list_comments("p1", 10, 0).await.unwrap().is_empty());
        assert!(matches!(
            store.list_comments("ghost", 10, 0).await,
            Err(CustomError::NotFoundError(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_and_readers() {
        let store = Arc::new(store_with_comments(0).await);

        let mut handles = Vec::new();
        for writer in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    store
                        .create_comment(comment(&format!("w{}-{}", writer, i), "p1"))
                        .await
                        .unwrap();
                    let _ = store.list_comments("p1", 5, 0).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let all = store.list_comments("p1", 0, 0).await.unwrap();
        assert_eq!(all.len(), 200);

        // per-writer order survives interleaving
        let writer_zero: Vec<&str> = all
            .iter()
            .rev()
            .map(|c| c.id.as_str())
            .filter(|id| id.starts_with("w0-"))
            .collect();
        let expected: Vec<String> = (0..25).map(|i| format!("w0-{}", i)).collect();
        assert_eq!(writer_zero, expected);
    }
}
