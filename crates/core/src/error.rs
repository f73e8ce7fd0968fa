//! Error type for domain-level failures.
//!
//! The HTTP layer turns each variant into a status and a stable error code.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed or out-of-range input. Maps to 400.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No usable credentials. Maps to 401.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed. Maps to 403.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}
