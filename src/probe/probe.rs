//! # HealthProbe: the bounded retry loop.
//!
//! ```text
//! check()
//!   ├─► attempt 1 ── fetch under attempt_timeout
//!   │      ├─ healthy   ──► record success ──► true
//!   │      ├─ unhealthy ──► ProbeFailed
//!   │      └─ error/timeout ──► ProbeFailed
//!   ├─► sleep backoff.next(0) ─► attempt 2 ── ...
//!   ├─► ... up to 1 + max_retries attempts, then
//!   └─► record failure ──► false
//! ```
//!
//! A check never retries forever: callers gate an operation on the boolean
//! and decide for themselves when to check again.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::RwLock;
use tokio::time;

use crate::events::{Bus, Event, EventKind};
use crate::policies::BackoffPolicy;
use crate::probe::backend::HealthBackend;
use crate::probe::status::HealthStatus;
use crate::ProbeError;

/// Tunables for one probe.
#[derive(Clone, Debug)]
pub struct ProbeConfig {
    /// Extra attempts after the first one fails (total attempts = 1 + this).
    pub max_retries: u32,
    /// Deadline for a single attempt; a slow fetch is aborted and counted
    /// as a failed attempt.
    pub attempt_timeout: Duration,
    /// How the delay between attempts grows.
    pub backoff: BackoffPolicy,
}

impl Default for ProbeConfig {
    /// Two retries, 3s per attempt, 500ms → 8s backoff.
    fn default() -> Self {
        Self {
            max_retries: 2,
            attempt_timeout: Duration::from_secs(3),
            backoff: BackoffPolicy {
                first: Duration::from_millis(500),
                max: Duration::from_secs(8),
                factor: 2.0,
                jitter: Default::default(),
            },
        }
    }
}

/// Bounded readiness check with a shared, cached status.
///
/// Clone-free sharing: wrap the probe in an `Arc`, or hand out
/// [`status_handle`](Self::status_handle) to readers that only need the
/// cached snapshot.
///
/// ```no_run
/// use relink::{HealthProbe, HttpBackend, ProbeConfig};
///
/// # async fn demo() {
/// let probe = HealthProbe::new(
///     HttpBackend::new("http://127.0.0.1:8080/health"),
///     ProbeConfig::default(),
/// );
/// if probe.check().await {
///     // safe to start work that needs a live backend
/// }
/// # }
/// ```
pub struct HealthProbe {
    backend: Arc<dyn HealthBackend>,
    cfg: ProbeConfig,
    status: Arc<RwLock<HealthStatus>>,
    bus: Option<Bus>,
}

impl HealthProbe {
    /// Creates a probe over `backend`.
    pub fn new(backend: impl HealthBackend, cfg: ProbeConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            cfg,
            status: Arc::new(RwLock::new(HealthStatus::default())),
            bus: None,
        }
    }

    /// Publishes `ProbeSucceeded` / `ProbeFailed` events to `bus`, so the
    /// probe shares an observability pipeline with an
    /// [`EventChannel`](crate::EventChannel).
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Runs one bounded check with the configured retry budget.
    ///
    /// Returns `true` the moment any attempt reports healthy. Returns
    /// `false` after `1 + max_retries` failed attempts; the cached
    /// [`HealthStatus`] is updated either way.
    pub async fn check(&self) -> bool {
        self.check_with(self.cfg.max_retries, self.cfg.attempt_timeout)
            .await
    }

    /// Like [`check`](Self::check) with a one-off retry budget and deadline
    /// (e.g. a cheap zero-retry poll on a status page).
    pub async fn check_with(&self, max_retries: u32, attempt_timeout: Duration) -> bool {
        for attempt in 0..=max_retries {
            if attempt > 0 {
                time::sleep(self.cfg.backoff.next(attempt - 1)).await;
            }

            match self.attempt(attempt_timeout).await {
                Ok(()) => {
                    self.record(true).await;
                    self.emit(
                        Event::new(EventKind::ProbeSucceeded).with_attempt(attempt + 1),
                    );
                    return true;
                }
                Err(e) => {
                    self.emit(
                        Event::new(EventKind::ProbeFailed)
                            .with_reason(e.as_message())
                            .with_attempt(attempt + 1),
                    );
                }
            }
        }

        self.record(false).await;
        false
    }

    /// The cached status from the last completed check.
    pub async fn status(&self) -> HealthStatus {
        self.status.read().await.clone()
    }

    /// A shared handle to the cached status, for readers that must not be
    /// able to trigger checks.
    pub fn status_handle(&self) -> Arc<RwLock<HealthStatus>> {
        Arc::clone(&self.status)
    }

    /// One fetch under `deadline`.
    async fn attempt(&self, deadline: Duration) -> Result<(), ProbeError> {
        let fetched = time::timeout(deadline, self.backend.fetch())
            .await
            .map_err(|_| ProbeError::Timeout { timeout: deadline })??;

        if fetched.is_healthy() {
            Ok(())
        } else {
            Err(ProbeError::Unhealthy {
                status: fetched.status,
            })
        }
    }

    /// Updates the cached status once per completed check.
    async fn record(&self, healthy: bool) {
        let mut status = self.status.write().await;
        status.healthy = healthy;
        status.last_checked_at = Some(SystemTime::now());
        if healthy {
            status.consecutive_failures = 0;
        } else {
            status.consecutive_failures += 1;
        }
    }

    fn emit(&self, ev: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(ev);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::probe::backend::HealthReport;

    /// Scripted backend: pops one outcome per fetch; an exhausted script
    /// keeps repeating the last behavior as a request failure.
    struct ScriptedBackend {
        script: Mutex<Vec<Result<&'static str, ProbeError>>>,
        calls: AtomicU32,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<&'static str, ProbeError>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(AtomicOrdering::Relaxed)
        }
    }

    #[async_trait]
    impl HealthBackend for ScriptedBackend {
        async fn fetch(&self) -> Result<HealthReport, ProbeError> {
            self.calls.fetch_add(1, AtomicOrdering::Relaxed);
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Err(ProbeError::Request {
                    reason: "script exhausted".into(),
                });
            }
            script.remove(0).map(|status| HealthReport {
                status: status.to_string(),
            })
        }
    }

    /// Backend whose fetch never completes; only the attempt deadline
    /// terminates it.
    struct StuckBackend {
        calls: AtomicU32,
    }

    #[async_trait]
    impl HealthBackend for StuckBackend {
        async fn fetch(&self) -> Result<HealthReport, ProbeError> {
            self.calls.fetch_add(1, AtomicOrdering::Relaxed);
            futures::future::pending().await
        }
    }

    fn fast_config() -> ProbeConfig {
        ProbeConfig {
            max_retries: 2,
            attempt_timeout: Duration::from_secs(3),
            backoff: BackoffPolicy {
                first: Duration::from_millis(100),
                max: Duration::from_secs(1),
                factor: 2.0,
                jitter: Default::default(),
            },
        }
    }

    fn request_err() -> ProbeError {
        ProbeError::Request {
            reason: "connection refused".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dead_backend_exhausts_retry_budget() {
        let backend = ScriptedBackend::new(vec![
            Err(request_err()),
            Err(request_err()),
            Err(request_err()),
        ]);
        let probe = HealthProbe::new(backend, fast_config());

        assert!(!probe.check().await);

        let status = probe.status().await;
        assert!(!status.healthy);
        assert!(status.last_checked_at.is_some());
        assert_eq!(status.consecutive_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_is_one_plus_max_retries() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let probe = HealthProbe::new(SharedBackend(Arc::clone(&backend)), fast_config());

        assert!(!probe.check().await);
        assert_eq!(backend.calls(), 3);

        assert!(!probe.check_with(0, Duration::from_secs(1)).await);
        assert_eq!(backend.calls(), 4);
    }

    /// Thin forwarding wrapper so tests can keep a handle on the backend.
    struct SharedBackend(Arc<ScriptedBackend>);

    #[async_trait]
    impl HealthBackend for SharedBackend {
        async fn fetch(&self) -> Result<HealthReport, ProbeError> {
            self.0.fetch().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_healthy_answer_short_circuits() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("healthy")]));
        let probe = HealthProbe::new(SharedBackend(Arc::clone(&backend)), fast_config());

        assert!(probe.check().await);
        assert_eq!(backend.calls(), 1);

        let status = probe.status().await;
        assert!(status.healthy);
        assert_eq!(status.consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unhealthy_payload_is_a_failed_attempt() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("starting"),
            Ok("starting"),
            Ok("starting"),
        ]));
        let probe = HealthProbe::new(SharedBackend(Arc::clone(&backend)), fast_config());

        assert!(!probe.check().await);
        assert_eq!(backend.calls(), 3);
        assert!(!probe.status().await.healthy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_on_a_later_attempt() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(request_err()), Ok("healthy")]));
        let probe = HealthProbe::new(SharedBackend(Arc::clone(&backend)), fast_config());

        assert!(probe.check().await);
        assert_eq!(backend.calls(), 2);
        assert!(probe.status().await.healthy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_deadline_aborts_stuck_fetch() {
        let probe = HealthProbe::new(
            StuckBackend {
                calls: AtomicU32::new(0),
            },
            fast_config(),
        );

        // Completes despite a fetch that never resolves; the paused clock
        // auto-advances through the deadlines and backoff sleeps.
        assert!(!probe.check().await);
        assert!(!probe.status().await.healthy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_failures_accumulate_and_reset() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(request_err()),
            Err(request_err()),
            Err(request_err()),
            Err(request_err()),
            Err(request_err()),
            Err(request_err()),
            Ok("healthy"),
        ]));
        let probe = HealthProbe::new(SharedBackend(Arc::clone(&backend)), fast_config());

        assert!(!probe.check().await);
        assert!(!probe.check().await);
        assert_eq!(probe.status().await.consecutive_failures, 2);

        assert!(probe.check().await);
        assert_eq!(probe.status().await.consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_events_reach_the_bus() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let backend = ScriptedBackend::new(vec![Err(request_err()), Ok("healthy")]);
        let probe = HealthProbe::new(backend, fast_config()).with_bus(bus);

        assert!(probe.check().await);

        let failed = rx.recv().await.unwrap();
        assert_eq!(failed.kind, EventKind::ProbeFailed);
        assert_eq!(failed.attempt, Some(1));

        let ok = rx.recv().await.unwrap();
        assert_eq!(ok.kind, EventKind::ProbeSucceeded);
        assert_eq!(ok.attempt, Some(2));
    }
}
