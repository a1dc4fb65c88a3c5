//! Error types used by the channel and the health probe.
//!
//! This module defines two main error enums:
//!
//! - [`ChannelError`] - failures around the event channel and its transport.
//! - [`ProbeError`] - failures of individual health-probe attempts.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics, plus retryability checks. Neither error ever escapes the
//! channel or probe internals to crash a caller: connection failures turn
//! into reconnect events, probe failures into a `false` check result.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the event channel.
///
/// Transient connectivity failures (`Connect`, `Transport`, `Liveness`) are
/// absorbed by the reconnect loop and only surface as events; the remaining
/// variants are returned from the public API.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ChannelError {
    /// A topic must be a non-empty string.
    #[error("topic must be a non-empty string")]
    EmptyTopic,

    /// The channel was shut down; its worker no longer accepts commands.
    #[error("channel is closed")]
    Closed,

    /// Opening the underlying connection failed.
    #[error("connect failed: {reason}")]
    Connect {
        /// Handshake failure detail.
        reason: String,
    },

    /// The established connection reported an I/O or protocol error.
    #[error("transport error: {reason}")]
    Transport {
        /// Underlying transport detail.
        reason: String,
    },

    /// An inbound or outbound message could not be (de)serialized.
    #[error("malformed message: {reason}")]
    Malformed {
        /// Parse/serialize failure detail.
        reason: String,
    },

    /// No inbound traffic within the liveness window; connection presumed dead.
    #[error("no traffic within liveness window {window:?}")]
    Liveness {
        /// The configured liveness window that elapsed.
        window: Duration,
    },
}

impl ChannelError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use relink::ChannelError;
    ///
    /// let err = ChannelError::EmptyTopic;
    /// assert_eq!(err.as_label(), "channel_empty_topic");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ChannelError::EmptyTopic => "channel_empty_topic",
            ChannelError::Closed => "channel_closed",
            ChannelError::Connect { .. } => "channel_connect_failed",
            ChannelError::Transport { .. } => "channel_transport_error",
            ChannelError::Malformed { .. } => "channel_malformed_message",
            ChannelError::Liveness { .. } => "channel_liveness_timeout",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ChannelError::EmptyTopic => "empty topic".to_string(),
            ChannelError::Closed => "channel closed".to_string(),
            ChannelError::Connect { reason } => format!("connect: {reason}"),
            ChannelError::Transport { reason } => format!("transport: {reason}"),
            ChannelError::Malformed { reason } => format!("malformed: {reason}"),
            ChannelError::Liveness { window } => format!("liveness window {window:?} elapsed"),
        }
    }

    /// Indicates whether the reconnect loop should absorb this error.
    ///
    /// Returns `true` for [`ChannelError::Connect`], [`ChannelError::Transport`]
    /// and [`ChannelError::Liveness`], `false` otherwise.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ChannelError::Connect { .. }
                | ChannelError::Transport { .. }
                | ChannelError::Liveness { .. }
        )
    }
}

/// # Errors produced by a single health-probe attempt.
///
/// Every variant is treated as a failed attempt and retried identically;
/// [`ProbeError::Unhealthy`] is distinguished for diagnostics only.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The HTTP request could not be completed (network/DNS/parse error).
    #[error("request failed: {reason}")]
    Request {
        /// Underlying client error detail.
        reason: String,
    },

    /// The endpoint responded with a non-success HTTP status.
    #[error("endpoint returned HTTP {status}")]
    Status {
        /// HTTP status code observed.
        status: u16,
    },

    /// The attempt did not complete within its deadline and was aborted.
    #[error("attempt timed out after {timeout:?}")]
    Timeout {
        /// The per-attempt deadline that elapsed.
        timeout: Duration,
    },

    /// The backend answered, but the payload reports an unhealthy status.
    #[error("backend reports unhealthy status: {status}")]
    Unhealthy {
        /// The status string found in the payload.
        status: String,
    },
}

impl ProbeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ProbeError::Request { .. } => "probe_request_failed",
            ProbeError::Status { .. } => "probe_bad_status",
            ProbeError::Timeout { .. } => "probe_timeout",
            ProbeError::Unhealthy { .. } => "probe_unhealthy",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ProbeError::Request { reason } => format!("request: {reason}"),
            ProbeError::Status { status } => format!("http status {status}"),
            ProbeError::Timeout { timeout } => format!("timeout after {timeout:?}"),
            ProbeError::Unhealthy { status } => format!("unhealthy: {status}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_labels_are_stable() {
        let err = ChannelError::Transport {
            reason: "broken pipe".into(),
        };
        assert_eq!(err.as_label(), "channel_transport_error");
        assert!(err.as_message().contains("broken pipe"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ChannelError::Connect {
            reason: "refused".into()
        }
        .is_retryable());
        assert!(ChannelError::Liveness {
            window: Duration::from_secs(45)
        }
        .is_retryable());
        assert!(!ChannelError::EmptyTopic.is_retryable());
        assert!(!ChannelError::Closed.is_retryable());
    }

    #[test]
    fn test_probe_labels_are_stable() {
        let err = ProbeError::Unhealthy {
            status: "starting".into(),
        };
        assert_eq!(err.as_label(), "probe_unhealthy");
        assert!(err.as_message().contains("starting"));
    }
}
