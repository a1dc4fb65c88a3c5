//! Gate an operation on backend readiness:
//!
//! ```bash
//! RELINK_HEALTH_URL=http://127.0.0.1:8080/health cargo run --example health_gate
//! ```
//!
//! Runs one bounded health check (1 + 2 attempts, 3s each, capped backoff
//! between attempts) and exits 0 only when the backend reports healthy.

use relink::{HealthProbe, HttpBackend, ProbeConfig};

#[tokio::main]
async fn main() {
    let url = std::env::var("RELINK_HEALTH_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8080/health".to_string());

    let probe = HealthProbe::new(HttpBackend::new(&url), ProbeConfig::default());

    if probe.check().await {
        println!("backend at {url} is healthy");
        return;
    }

    let status = probe.status().await;
    eprintln!(
        "backend at {url} is not ready (consecutive failed checks: {})",
        status.consecutive_failures
    );
    std::process::exit(1);
}
