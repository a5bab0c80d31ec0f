use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use log::{debug, info};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::comment::model::Comment;

/// Per-subscriber buffer. A subscriber that falls behind holds up the
/// publisher until it drains or goes away.
pub const SUBSCRIBER_BUFFER: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
struct Registry {
    /// post id -> live sinks for that post
    posts: HashMap<String, HashMap<SubscriptionId, mpsc::Sender<Comment>>>,
    /// subscription id -> post id, so unsubscribe needs only the id
    owners: HashMap<SubscriptionId, String>,
}

/// Fans newly created comments out to everyone watching the post.
///
/// Cloning is cheap and every clone shares the same registry.
#[derive(Clone, Default)]
pub struct NotificationHub {
    registry: Arc<Mutex<Registry>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber for `post_id`. The registration lives as long
    /// as the returned handle.
    pub fn subscribe(&self, post_id: &str) -> Subscription {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_BUFFER);
        let id = SubscriptionId(Uuid::new_v4());

        {
            let mut registry = self.registry.lock();
            registry
                .posts
                .entry(post_id.to_string())
                .or_default()
                .insert(id, sender);
            registry.owners.insert(id, post_id.to_string());
        }

        info!("Subscription {} opened for post {}", id, post_id);

        Subscription {
            id,
            post_id: post_id.to_string(),
            receiver,
            hub: self.clone(),
        }
    }

    /// Remove a registration. Unknown or already removed ids are ignored.
    /// Returns whether anything was removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.lock();
        let Some(post_id) = registry.owners.remove(&id) else {
            return false;
        };
        if let Some(sinks) = registry.posts.get_mut(&post_id) {
            sinks.remove(&id);
            if sinks.is_empty() {
                registry.posts.remove(&post_id);
            }
        }
        drop(registry);

        info!("Subscription {} closed for post {}", id, post_id);
        true
    }

    /// Deliver `comment` to every sink registered for `post_id` at the time of
    /// the call. The registry lock is held only while taking the snapshot;
    /// sends happen outside it and wait on full buffers. Sinks that vanish
    /// mid-delivery are skipped. Returns the number of deliveries.
    pub async fn publish(&self, post_id: &str, comment: &Comment) -> usize {
        let sinks: Vec<(SubscriptionId, mpsc::Sender<Comment>)> = {
            let registry = self.registry.lock();
            match registry.posts.get(post_id) {
                Some(sinks) => sinks
                    .iter()
                    .map(|(id, sender)| (*id, sender.clone()))
                    .collect(),
                None => return 0,
            }
        };

        let mut delivered = 0;
        for (id, sink) in sinks {
            match sink.send(comment.clone()).await {
                Ok(()) => delivered += 1,
                Err(_) => debug!("Subscription {} went away before delivery", id),
            }
        }

        debug!(
            "Comment {} on post {} delivered to {} subscriber(s)",
            comment.id, post_id, delivered
        );
        delivered
    }

    pub fn subscriber_count(&self, post_id: &str) -> usize {
        self.registry
            .lock()
            .posts
            .get(post_id)
            .map_or(0, HashMap::len)
    }
}

/// Live registration for one post's new comments.
///
/// Dropping the handle deregisters it, exactly once. Reading is done with
/// [`Subscription::recv`], [`Subscription::recv_until`] or as a [`Stream`].
pub struct Subscription {
    id: SubscriptionId,
    post_id: String,
    receiver: mpsc::Receiver<Comment>,
    hub: NotificationHub,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    /// Wait for the next comment. The registry holds the sending half for as
    /// long as this handle exists, so while subscribed this waits rather than
    /// returning `None`.
    #[allow(dead_code)]
    pub async fn recv(&mut self) -> Option<Comment> {
        self.receiver.recv().await
    }

    /// Wait for the next comment or for `cancel` to complete, whichever
    /// happens first. `None` means cancelled.
    #[allow(dead_code)]
    pub async fn recv_until<F>(&mut self, cancel: F) -> Option<Comment>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            comment = self.receiver.recv() => comment,
            _ = cancel => None,
        }
    }
}

impl Stream for Subscription {
    type Item = Comment;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Comment>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}
