//! # Channel configuration.
//!
//! Provides [`ChannelConfig`], the centralized tunables for one
//! [`EventChannel`](crate::EventChannel), and [`PublishPolicy`], the
//! explicit choice of what `publish()` does while disconnected.
//!
//! ## Sentinel values
//! - `heartbeat_interval = 0s` → heartbeat/liveness checking disabled
//! - `connect_timeout = 0s` → no handshake deadline

use std::time::Duration;

use crate::policies::BackoffPolicy;

/// What an outbound `publish()` does while the channel is not connected.
///
/// The source of truth is explicit configuration, never silent ambiguity:
/// callers can rely on one policy for every call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishPolicy {
    /// Queue up to `capacity` messages and flush them, in order, after the
    /// next successful connect. On overflow the **oldest** queued message is
    /// dropped (and reported via `PublishDropped`).
    Queue {
        /// Maximum number of queued messages (min 1, clamped).
        capacity: usize,
    },
    /// Drop the message immediately and report it via `PublishDropped`.
    Drop,
}

impl Default for PublishPolicy {
    /// Bounded queue of 256 messages, drop-oldest on overflow.
    fn default() -> Self {
        PublishPolicy::Queue { capacity: 256 }
    }
}

/// Configuration for one event channel.
///
/// Defines:
/// - **Recovery behavior**: backoff schedule, handshake deadline
/// - **Liveness**: heartbeat ping interval and the no-traffic window that
///   declares a connection dead
/// - **Offline publishes**: [`PublishPolicy`]
/// - **Event system**: bus capacity for event delivery
///
/// ## Field semantics
/// - `liveness_timeout` is measured against **any** inbound traffic (data,
///   pong, or other frames), not just pongs, so a busy connection never
///   trips it.
/// - A zero `heartbeat_interval` disables both pings and the liveness check.
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    /// How reconnect delays grow between attempts.
    pub backoff: BackoffPolicy,

    /// Period between heartbeat pings while connected (`0s` = disabled).
    pub heartbeat_interval: Duration,

    /// Window without inbound traffic after which the connection is treated
    /// as dead and force-closed (checked on heartbeat ticks).
    pub liveness_timeout: Duration,

    /// Deadline for a single connection handshake (`0s` = none).
    pub connect_timeout: Duration,

    /// Behavior of `publish()` while disconnected.
    pub publish_policy: PublishPolicy,

    /// Capacity of the event bus broadcast ring buffer (min 1; clamped).
    pub bus_capacity: usize,
}

impl ChannelConfig {
    /// True when heartbeat/liveness checking is enabled.
    #[inline]
    pub fn heartbeat_enabled(&self) -> bool {
        !self.heartbeat_interval.is_zero()
    }

    /// Returns the handshake deadline as an `Option`.
    #[inline]
    pub fn connect_deadline(&self) -> Option<Duration> {
        if self.connect_timeout.is_zero() {
            None
        } else {
            Some(self.connect_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ChannelConfig {
    /// Default configuration:
    ///
    /// - `backoff = BackoffPolicy::default()` (1s → 30s, exponential)
    /// - `heartbeat_interval = 15s`
    /// - `liveness_timeout = 45s`
    /// - `connect_timeout = 10s`
    /// - `publish_policy = Queue { capacity: 256 }`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            backoff: BackoffPolicy::default(),
            heartbeat_interval: Duration::from_secs(15),
            liveness_timeout: Duration::from_secs(45),
            connect_timeout: Duration::from_secs(10),
            publish_policy: PublishPolicy::default(),
            bus_capacity: 1024,
        }
    }
}
