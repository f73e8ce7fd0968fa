use docroute_classifier::ClassifierError;
use docroute_core::types::DbId;

use crate::store::StoreError;

/// Why a pipeline operation did not complete.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The liveness gate was closed; nothing was attempted.
    #[error("Backend is offline; ingestion is unavailable")]
    Offline,

    /// Classification failed; no record was created.
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    /// The store rejected or could not receive a write.
    #[error(transparent)]
    Persistence(StoreError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Document not found: {0}")]
    NotFound(DbId),
}

impl From<StoreError> for PipelineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => PipelineError::NotFound(id),
            StoreError::Validation(msg) => PipelineError::Validation(msg),
            other => PipelineError::Persistence(other),
        }
    }
}
