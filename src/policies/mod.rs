//! Retry policies.
//!
//! This module groups the knobs that control **how long** the channel (and
//! the health probe) wait between attempts.
//!
//! ## Contents
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization strategy to avoid thundering herd
//!
//! ## Quick wiring
//! ```text
//! ChannelConfig { backoff: BackoffPolicy, .. }
//!      └─► channel::worker uses backoff.next(failures - 1) to schedule
//!          the next reconnect attempt; the counter resets on success
//! ProbeConfig { backoff: BackoffPolicy, .. }
//!      └─► probe::HealthProbe sleeps backoff.next(attempt - 1) between
//!          bounded health-check attempts
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=1s, factor=2.0, max=30s, jitter=None.
//! - `JitterPolicy::None` by default; consider `Equal` when many clients
//!   share one backend.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
