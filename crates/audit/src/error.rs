//! Error types for the audit crate.

use thiserror::Error;

/// Errors an [`AuditSink`](crate::AuditSink) may report.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The backing store rejected or could not receive the entry.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// The payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other sink-specific failure.
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}
