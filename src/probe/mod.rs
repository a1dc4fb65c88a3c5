//! Health probe: bounded readiness checks against a backend endpoint.
//!
//! Unlike the channel's retry-forever reconnect loop, a probe check is
//! **bounded**: one initial attempt plus a capped number of retries, each
//! under its own deadline, with backoff between attempts. The outcome is a
//! plain `bool` plus a shared, cached [`HealthStatus`] snapshot.
//!
//! Internal modules:
//! - [`backend`]: the fetch abstraction (`HttpBackend` by default);
//! - [`probe`]: the retry loop and cached status;
//! - [`status`]: the shared snapshot type.

mod backend;
mod probe;
mod status;

pub use backend::{HealthBackend, HealthReport, HttpBackend};
pub use probe::{HealthProbe, ProbeConfig};
pub use status::HealthStatus;
