use std::time::SystemTime;

/// Cached result of the most recent completed health check.
///
/// Shared snapshot: read it via
/// [`HealthProbe::status`](crate::HealthProbe::status) without triggering
/// network traffic. `healthy` stays `false` until the first check completes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HealthStatus {
    /// Outcome of the last completed check.
    pub healthy: bool,
    /// When the last check completed; `None` before the first check.
    pub last_checked_at: Option<SystemTime>,
    /// Completed checks that failed in a row. Reset to zero on success;
    /// incremented once per failed check, not per attempt.
    pub consecutive_failures: u32,
}
