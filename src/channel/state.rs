//! Connection lifecycle states.
//!
//! Exactly one [`ConnectionState`] is current per channel at any time.
//! Transitions are driven only by connection lifecycle outcomes (open,
//! close, error) and by explicit `connect()`/`disconnect()` calls; the
//! current value is observable through
//! [`EventChannel::watch_state`](crate::EventChannel::watch_state).

use std::fmt;

/// Lifecycle state of the channel's single logical connection.
///
/// ```text
/// Disconnected ──connect()──► Connecting ──open──► Connected
///       ▲                         │                    │
///       │                      failure            drop/liveness
///  disconnect()                   ▼                    ▼
///       └───────────────────  Reconnecting ◄───────────┘
///                             (backoff, retries forever)
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and none being attempted.
    #[default]
    Disconnected,
    /// First attempt of a series is in flight.
    Connecting,
    /// The link is open and live.
    Connected,
    /// The link was lost (or an attempt failed); a retry is pending or in flight.
    Reconnecting,
}

impl ConnectionState {
    /// Returns a short stable label (snake_case) for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
        }
    }

    /// True while the channel is trying to be, or is, connected.
    ///
    /// A `connect()` issued in an active state has no effect.
    pub fn is_active(&self) -> bool {
        !matches!(self, ConnectionState::Disconnected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
