//! # EventChannel: the public handle.
//!
//! A cheaply-shareable handle (wrap it in an `Arc` and pass it from your
//! composition root) to the single worker task that owns the connection.
//! All mutation of connection state happens inside the worker; the handle
//! only does registry bookkeeping and pushes commands.
//!
//! ## Failure semantics
//! - Connect failures are retried forever with capped backoff - never fatal,
//!   only a status indicator.
//! - Malformed inbound messages are dropped per-message.
//! - `publish()` while disconnected follows the configured
//!   [`PublishPolicy`](crate::PublishPolicy) - explicitly queued or dropped,
//!   never silently ambiguous.
//! - No error escapes to crash a caller: failures are return values or
//!   observable events.

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use std::sync::Arc;

use crate::channel::frame::ClientFrame;
use crate::channel::handler::HandlerRef;
use crate::channel::registry::{SubscriptionHandle, SubscriptionRegistry};
use crate::channel::state::ConnectionState;
use crate::channel::worker::Command;
use crate::error::ChannelError;
use crate::events::{Bus, Event};
use crate::subscribers::SubscriberSet;

/// Handle to one self-healing event channel.
///
/// Built via [`ChannelBuilder`](crate::ChannelBuilder). One instance per
/// logical connection; components share the instance instead of opening
/// independent connections.
pub struct EventChannel {
    pub(crate) bus: Bus,
    pub(crate) registry: Arc<SubscriptionRegistry>,
    pub(crate) cmd_tx: mpsc::UnboundedSender<Command>,
    pub(crate) state_rx: watch::Receiver<ConnectionState>,
    pub(crate) token: CancellationToken,
    pub(crate) subs: Arc<SubscriberSet>,
    pub(crate) worker: JoinHandle<()>,
}

impl EventChannel {
    /// Starts connecting to `url`.
    ///
    /// Idempotent and ordered: the worker ignores the command while a
    /// connection series is already running, and a call issued right after
    /// [`disconnect`](Self::disconnect) is processed after it, starting a
    /// fresh series once the old one has closed. From then on the worker
    /// retries forever with capped backoff until
    /// [`disconnect`](Self::disconnect) or [`shutdown`](Self::shutdown).
    pub fn connect(&self, url: impl Into<String>) {
        let _ = self.cmd_tx.send(Command::Connect(url.into()));
    }

    /// Closes the connection deliberately.
    ///
    /// Cancels any in-flight handshake and any pending reconnect timer; no
    /// automatic reconnection follows. Subscriptions stay registered, so a
    /// later [`connect`](Self::connect) replays them.
    pub fn disconnect(&self) {
        let _ = self.cmd_tx.send(Command::Disconnect);
    }

    /// Registers a handler for `topic`.
    ///
    /// Pure bookkeeping plus, while connected, a protocol-level subscribe
    /// frame. The registration survives reconnects and is replayed after
    /// each successful connect.
    ///
    /// # Errors
    /// [`ChannelError::EmptyTopic`] if `topic` is empty.
    pub async fn subscribe(
        &self,
        topic: impl AsRef<str>,
        handler: HandlerRef,
    ) -> Result<SubscriptionHandle, ChannelError> {
        let topic = topic.as_ref();
        if topic.is_empty() {
            return Err(ChannelError::EmptyTopic);
        }

        let handle = self.registry.insert(topic, handler).await;
        if self.state() == ConnectionState::Connected {
            let _ = self.cmd_tx.send(Command::Send(ClientFrame::Subscribe {
                topic: topic.to_string(),
            }));
        }
        Ok(handle)
    }

    /// Removes the registration behind `handle`.
    ///
    /// If it was the last handler for its topic and the channel is
    /// connected, a protocol-level unsubscribe frame is sent; otherwise the
    /// state is just dropped locally. Safe to call from inside a handler
    /// that is currently being dispatched.
    pub async fn unsubscribe(&self, handle: SubscriptionHandle) {
        let outcome = self.registry.remove(&handle).await;
        if outcome.topic_emptied && self.state() == ConnectionState::Connected {
            let _ = self.cmd_tx.send(Command::Send(ClientFrame::Unsubscribe {
                topic: handle.topic().to_string(),
            }));
        }
    }

    /// Publishes a message tagged with `topic`.
    ///
    /// While connected the frame goes straight to the wire; while
    /// disconnected the configured [`PublishPolicy`](crate::PublishPolicy)
    /// applies (bounded queue flushed on reconnect by default). The outcome
    /// is observable via `PublishQueued` / `PublishDropped` events.
    ///
    /// # Errors
    /// - [`ChannelError::EmptyTopic`] if `topic` is empty.
    /// - [`ChannelError::Closed`] after [`shutdown`](Self::shutdown).
    pub fn publish(&self, topic: impl AsRef<str>, payload: Value) -> Result<(), ChannelError> {
        let topic = topic.as_ref();
        if topic.is_empty() {
            return Err(ChannelError::EmptyTopic);
        }
        self.cmd_tx
            .send(Command::Send(ClientFrame::Publish {
                topic: topic.to_string(),
                payload,
            }))
            .map_err(|_| ChannelError::Closed)
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// A watcher over state transitions (for UI status indicators).
    ///
    /// ```no_run
    /// # async fn demo(channel: &relink::EventChannel) {
    /// let mut state = channel.watch_state();
    /// while state.changed().await.is_ok() {
    ///     println!("status: {}", *state.borrow());
    /// }
    /// # }
    /// ```
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// A receiver of lifecycle [`Event`]s (reconnect attempts, drops, replay).
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Stops the worker and the subscriber fan-out for good.
    ///
    /// The handle is consumed; a shut-down channel cannot reconnect.
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.worker.await;
        // Best effort: the fan-out listener holds the other strong reference
        // until it drains; its workers stop once the queues close.
        if let Some(set) = Arc::into_inner(self.subs) {
            set.shutdown().await;
        }
    }
}
