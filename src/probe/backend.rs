//! # Health-check backends.
//!
//! [`HealthBackend`] abstracts one fetch of the backend's health document;
//! [`HttpBackend`] is the production implementation (GET + JSON body).
//! Tests swap in scripted backends.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ProbeError;

/// The health document returned by the endpoint.
///
/// Only the `status` field matters; unknown fields are ignored so the
/// endpoint may evolve freely.
#[derive(Clone, Debug, Deserialize)]
pub struct HealthReport {
    /// Status string reported by the backend.
    pub status: String,
}

impl HealthReport {
    /// True when the backend declares itself ready.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// One fetch of the backend's health document.
///
/// An implementation performs exactly one attempt with no internal retries
/// or timeouts; the probe owns the retry loop and the per-attempt deadline.
#[async_trait]
pub trait HealthBackend: Send + Sync + 'static {
    /// Fetches the current health document.
    async fn fetch(&self) -> Result<HealthReport, ProbeError>;
}

/// HTTP backend: `GET <url>` expecting a JSON [`HealthReport`] body.
pub struct HttpBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpBackend {
    /// Creates a backend probing `url` (e.g. `http://127.0.0.1:8080/health`).
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Creates a backend reusing an existing [`reqwest::Client`] (and its
    /// connection pool).
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl HealthBackend for HttpBackend {
    async fn fetch(&self) -> Result<HealthReport, ProbeError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ProbeError::Request {
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProbeError::Status {
                status: status.as_u16(),
            });
        }

        resp.json::<HealthReport>()
            .await
            .map_err(|e| ProbeError::Request {
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_accepts_extra_fields() {
        let report: HealthReport =
            serde_json::from_str(r#"{"status":"healthy","uptime_s":42}"#).unwrap();
        assert!(report.is_healthy());
    }

    #[test]
    fn test_only_healthy_counts() {
        let report: HealthReport = serde_json::from_str(r#"{"status":"starting"}"#).unwrap();
        assert!(!report.is_healthy());
    }
}
