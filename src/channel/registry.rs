//! # Subscription registry: topic → ordered handler list.
//!
//! Holds every active subscription, keyed by topic. Multiple handlers per
//! topic are allowed; registration order determines invocation order.
//!
//! ## Rules
//! - Subscriptions **persist across reconnects** - they are never cleared on
//!   disconnect. The worker replays one protocol-level subscribe frame per
//!   registered topic after each successful connect.
//! - Dispatch iterates over a **snapshot** of the handler list, never the
//!   live collection, so a handler may unsubscribe itself (or others) while
//!   a message is being dispatched without corrupting the iteration.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::channel::handler::HandlerRef;

/// Identifies one registration; returned by
/// [`EventChannel::subscribe`](crate::EventChannel::subscribe) and consumed
/// by [`EventChannel::unsubscribe`](crate::EventChannel::unsubscribe).
#[derive(Clone, Debug)]
pub struct SubscriptionHandle {
    id: u64,
    topic: Arc<str>,
}

impl SubscriptionHandle {
    /// The topic this handle is registered on.
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// One registered handler.
struct SubEntry {
    id: u64,
    handler: HandlerRef,
}

/// Result of removing a subscription.
pub(crate) struct RemoveOutcome {
    /// The handle referred to a live registration.
    pub removed: bool,
    /// No handlers remain for the topic; a protocol-level unsubscribe is due.
    pub topic_emptied: bool,
}

/// Thread-safe topic → handlers map.
pub(crate) struct SubscriptionRegistry {
    next_id: AtomicU64,
    topics: RwLock<HashMap<String, Vec<SubEntry>>>,
}

impl SubscriptionRegistry {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a handler; pure bookkeeping, no wire side effect.
    pub(crate) async fn insert(&self, topic: &str, handler: HandlerRef) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
        let mut topics = self.topics.write().await;
        topics
            .entry(topic.to_string())
            .or_default()
            .push(SubEntry { id, handler });
        SubscriptionHandle {
            id,
            topic: Arc::from(topic),
        }
    }

    /// Removes the registration behind `handle`.
    ///
    /// Removing twice is harmless: the second call reports `removed: false`.
    pub(crate) async fn remove(&self, handle: &SubscriptionHandle) -> RemoveOutcome {
        let mut topics = self.topics.write().await;
        let Some(entries) = topics.get_mut(handle.topic()) else {
            return RemoveOutcome {
                removed: false,
                topic_emptied: false,
            };
        };

        let before = entries.len();
        entries.retain(|e| e.id != handle.id);
        let removed = entries.len() < before;

        let topic_emptied = removed && entries.is_empty();
        if topic_emptied {
            topics.remove(handle.topic());
        }
        RemoveOutcome {
            removed,
            topic_emptied,
        }
    }

    /// Topics with at least one handler, for subscribe-frame replay.
    pub(crate) async fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.topics.read().await.keys().cloned().collect();
        // Stable replay order keeps logs and tests deterministic.
        topics.sort_unstable();
        topics
    }

    /// Snapshot of the handlers for `topic`, in registration order.
    ///
    /// Dispatch runs against this snapshot with no lock held, so handlers
    /// may freely mutate the registry while being invoked.
    pub(crate) async fn snapshot(&self, topic: &str) -> Vec<HandlerRef> {
        self.topics
            .read()
            .await
            .get(topic)
            .map(|entries| entries.iter().map(|e| Arc::clone(&e.handler)).collect())
            .unwrap_or_default()
    }

    /// True if `topic` has at least one handler.
    #[cfg(test)]
    pub(crate) async fn contains(&self, topic: &str) -> bool {
        self.topics.read().await.contains_key(topic)
    }
}
