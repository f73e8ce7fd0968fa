use std::sync::Arc;

use docroute_audit::{AuditTrail, PgAuditSink};
use docroute_classifier::Classifier;
use docroute_core::error::CoreError;
use docroute_core::liveness::Liveness;
use docroute_core::settings::SettingsHandle;
use docroute_pipeline::{IngestionPipeline, PgDocumentStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: docroute_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub pipeline: IngestionPipeline,
    /// Audit recorder for events raised by handlers (auth, settings, ...).
    pub audit: AuditTrail,
    /// Live routing settings, shared with the pipeline.
    pub settings: SettingsHandle,
    /// Reader for the connectivity monitor's flag.
    pub liveness: Liveness,
}

impl AppState {
    /// Wire the PostgreSQL-backed store and audit sink around `classifier`.
    pub fn new(
        pool: docroute_db::DbPool,
        config: Arc<ServerConfig>,
        classifier: Arc<dyn Classifier>,
        liveness: Liveness,
    ) -> Result<Self, CoreError> {
        let settings = SettingsHandle::new(config.settings.clone())?;
        let audit = AuditTrail::new(Arc::new(PgAuditSink::new(pool.clone())));
        let pipeline = IngestionPipeline::new(
            classifier,
            Arc::new(PgDocumentStore::new(pool.clone())),
            audit.clone(),
            settings.clone(),
            liveness.clone(),
        );

        Ok(Self {
            pool,
            config,
            pipeline,
            audit,
            settings,
            liveness,
        })
    }
}
