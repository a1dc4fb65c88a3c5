//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! Primarily useful for development, debugging, and the bundled demos.
//!
//! ## Output format
//! ```text
//! [connecting] attempt=1
//! [connected]
//! [connect-failed] err="connection refused" attempt=1
//! [reconnect] delay=2000ms attempt=2
//! [connection-lost] err="closed by peer"
//! [heartbeat-missed] window=45000ms
//! [closed]
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::Connecting => {
                println!("[connecting] attempt={:?}", e.attempt);
            }
            EventKind::Connected => {
                println!("[connected]");
            }
            EventKind::ConnectFailed => {
                println!("[connect-failed] err={:?} attempt={:?}", e.reason, e.attempt);
            }
            EventKind::ConnectionLost => {
                println!("[connection-lost] err={:?}", e.reason);
            }
            EventKind::ReconnectScheduled => {
                println!(
                    "[reconnect] delay={:?}ms attempt={:?}",
                    e.delay_ms, e.attempt
                );
            }
            EventKind::HeartbeatMissed => {
                println!("[heartbeat-missed] window={:?}ms", e.timeout_ms);
            }
            EventKind::Closed => {
                println!("[closed]");
            }
            EventKind::MessageDropped => {
                println!("[message-dropped] err={:?}", e.reason);
            }
            EventKind::PublishQueued => {
                println!("[publish-queued] topic={:?}", e.topic);
            }
            EventKind::PublishDropped => {
                println!("[publish-dropped] topic={:?} err={:?}", e.topic, e.reason);
            }
            EventKind::SubscriptionReplayed => {
                println!("[replayed] topic={:?}", e.topic);
            }
            EventKind::ProbeSucceeded => {
                println!("[probe-ok] attempt={:?}", e.attempt);
            }
            EventKind::ProbeFailed => {
                println!("[probe-failed] err={:?} attempt={:?}", e.reason, e.attempt);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
