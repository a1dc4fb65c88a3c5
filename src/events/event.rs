//! # Lifecycle events emitted by the channel worker and the health probe.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Connection lifecycle**: connecting, connected, lost, reconnect scheduling
//! - **Traffic accounting**: dropped inbound messages, queued/dropped publishes,
//!   subscription replay
//! - **Probe outcomes**: health check success/failure
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! topic, reasons, attempt numbers, and backoff delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use relink::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ReconnectScheduled)
//!     .with_attempt(4)
//!     .with_delay(Duration::from_secs(8));
//!
//! assert_eq!(ev.kind, EventKind::ReconnectScheduled);
//! assert_eq!(ev.attempt, Some(4));
//! assert_eq!(ev.delay_ms, Some(8_000));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of channel and probe events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Connection lifecycle ===
    /// A connection attempt is starting.
    ///
    /// Sets:
    /// - `attempt`: attempt number within the current series (1-based)
    Connecting,

    /// The connection is open; subscriptions are about to be replayed.
    Connected,

    /// A connection attempt failed before the link was established.
    ///
    /// Sets:
    /// - `reason`: handshake failure detail
    /// - `attempt`: attempt number within the current series
    ConnectFailed,

    /// An established connection dropped unexpectedly.
    ///
    /// Sets:
    /// - `reason`: close/error detail
    ConnectionLost,

    /// The next reconnect attempt has been scheduled.
    ///
    /// Sets:
    /// - `delay_ms`: backoff delay before the attempt
    /// - `attempt`: number of the upcoming attempt (1-based)
    ReconnectScheduled,

    /// No inbound traffic within the liveness window; the link will be
    /// force-closed and the reconnect path taken.
    ///
    /// Sets:
    /// - `timeout_ms`: the configured liveness window
    HeartbeatMissed,

    /// The connection was closed deliberately via `disconnect()`.
    /// No reconnect follows.
    Closed,

    // === Traffic accounting ===
    /// An inbound message could not be parsed and was dropped.
    /// The connection stays up.
    ///
    /// Sets:
    /// - `reason`: parse failure detail
    MessageDropped,

    /// A publish issued while offline was queued for send-on-reconnect.
    ///
    /// Sets:
    /// - `topic`: the message topic
    PublishQueued,

    /// A publish was dropped (drop policy, queue overflow, or encode failure).
    ///
    /// Sets:
    /// - `topic`: the message topic
    /// - `reason`: why it was dropped
    PublishDropped,

    /// A topic subscription was re-sent to the server after (re)connect.
    ///
    /// Sets:
    /// - `topic`: the replayed topic
    SubscriptionReplayed,

    // === Probe outcomes ===
    /// A health check reported healthy.
    ///
    /// Sets:
    /// - `attempt`: the attempt that succeeded (1-based)
    ProbeSucceeded,

    /// A single health-check attempt failed.
    ///
    /// Sets:
    /// - `reason`: failure detail
    /// - `attempt`: the attempt that failed (1-based)
    ProbeFailed,
}

/// Channel event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Message topic, if applicable.
    pub topic: Option<Arc<str>>,
    /// Human-readable reason (errors, drop details, etc.).
    pub reason: Option<Arc<str>>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Backoff delay before the next attempt in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Liveness window / timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            topic: None,
            reason: None,
            attempt: None,
            delay_ms: None,
            timeout_ms: None,
        }
    }

    /// Attaches a message topic.
    #[inline]
    pub fn with_topic(mut self, topic: impl Into<Arc<str>>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a timeout/window duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }
}
