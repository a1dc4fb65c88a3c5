//! # Topic handler abstraction and closure-backed implementation.
//!
//! This module defines the [`TopicHandler`] trait (async message callback)
//! and a convenient closure-backed implementation [`HandlerFn`]. The common
//! handle type is [`HandlerRef`], an `Arc<dyn TopicHandler>` suitable for
//! storing in the subscription registry.
//!
//! Handlers for one topic are invoked sequentially, in registration order,
//! in the order messages arrive on the wire. A slow handler delays later
//! messages on the same connection, so keep handlers quick or hand work off
//! to a task.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::channel::frame::Envelope;

/// Shared handle to a topic handler.
pub type HandlerRef = Arc<dyn TopicHandler>;

/// # Asynchronous per-topic message callback.
///
/// Implementations must not panic on malformed payloads - the payload is
/// arbitrary JSON and only the envelope shape is validated upstream.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use relink::{Envelope, TopicHandler};
///
/// struct Counter;
///
/// #[async_trait]
/// impl TopicHandler for Counter {
///     async fn on_message(&self, msg: &Envelope) {
///         println!("got {} on {}", msg.payload, msg.topic);
///     }
/// }
/// ```
#[async_trait]
pub trait TopicHandler: Send + Sync + 'static {
    /// Handles one inbound message on a subscribed topic.
    async fn on_message(&self, msg: &Envelope);
}

/// Closure-backed handler implementation.
///
/// Wraps a closure that *creates* a new future per message, so no shared
/// mutable state is required. If handlers need shared state, move an
/// `Arc<...>` into the closure explicitly.
///
/// ## Example
/// ```rust
/// use relink::{Envelope, HandlerFn, HandlerRef};
///
/// let h: HandlerRef = HandlerFn::arc(|msg: Envelope| async move {
///     println!("{} -> {}", msg.topic, msg.payload);
/// });
/// ```
pub struct HandlerFn<F> {
    f: F,
}

impl<F, Fut> HandlerFn<F>
where
    F: Fn(Envelope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    /// Creates a new closure-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared [`HandlerRef`].
    pub fn arc(f: F) -> HandlerRef {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> TopicHandler for HandlerFn<F>
where
    F: Fn(Envelope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn on_message(&self, msg: &Envelope) {
        (self.f)(msg.clone()).await
    }
}
