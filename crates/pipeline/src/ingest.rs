//! Ingestion orchestration.
//!
//! One call to [`IngestionPipeline::ingest`] takes one file through
//! `PENDING -> PROCESSING -> {ROUTED | QUARANTINED | FAILED}`:
//!
//! 1. refuse immediately when the liveness gate is closed
//! 2. audit `FILE_INGEST_START`
//! 3. classify (on failure audit `API_CRITICAL_FAILURE` and stop)
//! 4. apply the routing policy
//! 5. assemble the record with a fresh id and timestamp
//! 6. persist (on failure audit `API_CRITICAL_FAILURE` and stop)
//! 7. audit `CLASSIFICATION_FINISH`
//! 8. return the stored record
//!
//! Only routed or quarantined records ever reach the store. Batches run one
//! independent instance per file; the instances share nothing but the
//! liveness flag and the store.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use docroute_audit::AuditTrail;
use docroute_classifier::{mime, Classifier};
use docroute_core::audit::{event_names, Actor, LogLevel};
use docroute_core::document::{DocumentPatch, DocumentRecord, Origin, RoutingStatus};
use docroute_core::ids::{IdGenerator, UuidV7Generator};
use docroute_core::liveness::Liveness;
use docroute_core::routing::decide;
use docroute_core::settings::SettingsHandle;
use docroute_core::types::{now_millis, DbId, EpochMillis};
use futures::future::join_all;
use serde_json::json;

use crate::error::PipelineError;
use crate::store::DocumentStore;

/// Source of document timestamps in epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> EpochMillis + Send + Sync>;

/// One raw file to classify and route.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub file_name: String,
    pub mime_type: String,
    /// Passed to the classifier unchanged, even when empty.
    pub bytes: Vec<u8>,
    pub origin: Origin,
    pub owner: DbId,
}

/// Which records an update may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateScope {
    /// Only records owned by this user. Other records look absent.
    OwnedBy(DbId),
    /// Any record (administrators).
    Any,
}

#[derive(Clone)]
pub struct IngestionPipeline {
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn DocumentStore>,
    audit: AuditTrail,
    settings: SettingsHandle,
    liveness: Liveness,
    ids: Arc<dyn IdGenerator>,
    clock: Clock,
}

impl IngestionPipeline {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn DocumentStore>,
        audit: AuditTrail,
        settings: SettingsHandle,
        liveness: Liveness,
    ) -> Self {
        Self {
            classifier,
            store,
            audit,
            settings,
            liveness,
            ids: Arc::new(UuidV7Generator),
            clock: Arc::new(now_millis),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Run one file through the pipeline.
    pub async fn ingest(&self, request: IngestRequest) -> Result<DocumentRecord, PipelineError> {
        if !self.liveness.is_live() {
            tracing::warn!(file_name = %request.file_name, "Ingestion refused: backend offline");
            return Err(PipelineError::Offline);
        }

        let actor = Actor::User(request.owner);
        self.audit
            .record(
                actor,
                event_names::FILE_INGEST_START,
                LogLevel::Info,
                json!({ "fileName": request.file_name }),
            )
            .await;

        let classification = match self
            .classifier
            .classify(&request.bytes, &request.mime_type)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    file_name = %request.file_name,
                    error = %e,
                    "Classification failed"
                );
                self.audit
                    .record(
                        actor,
                        event_names::API_CRITICAL_FAILURE,
                        LogLevel::Error,
                        json!({
                            "fileName": request.file_name,
                            "stage": "classification",
                            "error": e.to_string(),
                        }),
                    )
                    .await;
                return Err(e.into());
            }
        };

        let decision = decide(&classification, &self.settings.snapshot());

        let record = DocumentRecord {
            id: self.ids.next_id(),
            name: request.file_name.clone(),
            timestamp: (self.clock)(),
            category: classification.category,
            confidence: classification.confidence,
            status: decision.status,
            extracted_fields: classification.extracted_fields,
            destination: decision.destination,
            summary: classification.summary,
            thumbnail: thumbnail_for(&request.mime_type, &request.bytes),
            flagged_for_retraining: None,
            origin: request.origin,
            user_id: request.owner,
        };

        if let Err(e) = self.store.create(&record).await {
            tracing::error!(document_id = %record.id, error = %e, "Failed to persist document");
            self.audit
                .record(
                    actor,
                    event_names::API_CRITICAL_FAILURE,
                    LogLevel::Error,
                    json!({
                        "fileName": record.name,
                        "stage": "persistence",
                        "error": e.to_string(),
                    }),
                )
                .await;
            return Err(PipelineError::from(e));
        }

        let level = match record.status {
            RoutingStatus::Routed => LogLevel::Success,
            _ => LogLevel::Warning,
        };
        self.audit
            .record(
                actor,
                event_names::CLASSIFICATION_FINISH,
                level,
                json!({
                    "id": record.id,
                    "fileName": record.name,
                    "status": record.status,
                    "destination": record.destination,
                }),
            )
            .await;

        tracing::info!(
            document_id = %record.id,
            status = %record.status,
            destination = %record.destination,
            "Document ingested"
        );
        Ok(record)
    }

    /// Run every request as its own pipeline instance, concurrently.
    ///
    /// Results come back in request order. One file failing does not affect
    /// the others.
    pub async fn ingest_batch(
        &self,
        requests: Vec<IngestRequest>,
    ) -> Vec<Result<DocumentRecord, PipelineError>> {
        join_all(requests.into_iter().map(|request| self.ingest(request))).await
    }

    /// Apply a partial update and audit it as `DOCUMENT_UPDATE`.
    ///
    /// Returns the record as stored after the update. A failed update leaves
    /// the stored record unchanged and writes no audit entry.
    pub async fn apply_update(
        &self,
        actor: Actor,
        scope: UpdateScope,
        id: DbId,
        patch: DocumentPatch,
    ) -> Result<DocumentRecord, PipelineError> {
        patch
            .validate()
            .map_err(|e| PipelineError::Validation(e.to_string()))?;

        let existing = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(PipelineError::NotFound(id))?;
        if let UpdateScope::OwnedBy(owner) = scope {
            if existing.user_id != owner {
                return Err(PipelineError::NotFound(id));
            }
        }

        let updated = self.store.update(id, &patch).await?;

        self.audit
            .record(
                actor,
                event_names::DOCUMENT_UPDATE,
                LogLevel::Success,
                json!({ "id": id, "updates": patch.field_names() }),
            )
            .await;

        tracing::info!(document_id = %id, fields = ?patch.field_names(), "Document updated");
        Ok(updated)
    }
}

impl std::fmt::Debug for IngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("live", &self.liveness.is_live())
            .finish_non_exhaustive()
    }
}

/// `data:` URL preview for image uploads, `None` for anything else.
pub fn thumbnail_for(mime_type: &str, bytes: &[u8]) -> Option<String> {
    if !mime::is_image(mime_type) {
        return None;
    }
    Some(format!(
        "data:{};base64,{}",
        mime::essence(mime_type),
        STANDARD.encode(bytes)
    ))
}
