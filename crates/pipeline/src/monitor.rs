//! Connectivity monitor.
//!
//! Probes backend availability once at startup and then on a fixed interval,
//! writing each result into the liveness flag. The monitor owns the only
//! [`LivenessSetter`]; the pipeline and HTTP layer hold readers.
//!
//! A probe never retries. A failed probe yields `false` until the next tick.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use docroute_core::liveness::{Liveness, LivenessSetter};
use docroute_db::DbPool;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

/// Default time between probes.
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(10);

#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// `true` when the backend can accept work right now.
    async fn probe(&self) -> bool;
}

/// Probes the database directly with `SELECT 1`.
#[derive(Debug, Clone)]
pub struct PgHealthProbe {
    pool: DbPool,
}

impl PgHealthProbe {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProbe for PgHealthProbe {
    async fn probe(&self) -> bool {
        match docroute_db::health_check(&self.pool).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Database probe failed");
                false
            }
        }
    }
}

/// Body of a remote `GET /health`.
#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
    #[serde(default)]
    db_connected: bool,
}

/// Probes a remote service's `/health` endpoint.
///
/// The backend counts as live only when the endpoint answers 2xx with
/// `status == "online"` and `db_connected == true`.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpHealthProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn probe(&self) -> bool {
        let response = match self.client.get(&self.url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!(
                    status = %response.status(),
                    url = %self.url,
                    "Health endpoint returned error status"
                );
                return false;
            }
            Err(e) => {
                tracing::debug!(error = %e, url = %self.url, "Health endpoint unreachable");
                return false;
            }
        };

        match response.json::<HealthBody>().await {
            Ok(body) => body.status == "online" && body.db_connected,
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    url = %self.url,
                    "Health endpoint returned unexpected body"
                );
                false
            }
        }
    }
}

/// Scheduled prober and sole writer of the liveness flag.
pub struct ConnectivityMonitor {
    probe: Arc<dyn HealthProbe>,
    setter: LivenessSetter,
    interval: Duration,
}

impl ConnectivityMonitor {
    /// A zero `interval` falls back to [`DEFAULT_PROBE_INTERVAL`];
    /// `tokio::time::interval` refuses a zero period.
    pub fn new(probe: Arc<dyn HealthProbe>, setter: LivenessSetter, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            tracing::warn!(
                fallback_secs = DEFAULT_PROBE_INTERVAL.as_secs(),
                "Zero probe interval requested, using the default"
            );
            DEFAULT_PROBE_INTERVAL
        } else {
            interval
        };
        Self {
            probe,
            setter,
            interval,
        }
    }

    /// A reader for the flag this monitor writes.
    pub fn liveness(&self) -> Liveness {
        self.setter.reader()
    }

    /// Run one probe, store the result and log any transition.
    pub async fn probe_once(&self) -> bool {
        let live = self.probe.probe().await;
        let was_live = self.setter.set(live);

        match (was_live, live) {
            (true, false) => tracing::warn!("Backend went offline; new ingestion is paused"),
            (false, true) => tracing::info!("Backend is online"),
            (false, false) => tracing::debug!("Backend still offline"),
            (true, true) => {}
        }
        live
    }

    /// Probe immediately, then once per interval, until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Connectivity monitor started"
        );

        // The first tick completes immediately, which gives the startup probe.
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Connectivity monitor stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.probe_once().await;
                }
            }
        }
    }
}
