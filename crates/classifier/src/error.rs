use std::time::Duration;

/// Failures of a single classification call.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The mime type is not accepted by the model. No request was sent.
    #[error("Unsupported mime type: {0}")]
    UnsupportedMimeType(String),

    /// The model endpoint could not be reached (DNS, connect, TLS, ...).
    #[error("Classifier unreachable: {0}")]
    Unreachable(String),

    /// No response within the configured timeout.
    #[error("Classifier timed out after {0:?}")]
    Timeout(Duration),

    /// The model answered with a non-2xx status.
    #[error("Classifier rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The model answered 2xx but the body is unusable.
    #[error("Malformed classifier response: {0}")]
    Malformed(String),

    /// The HTTP client could not be constructed.
    #[error("Classifier client setup failed: {0}")]
    Setup(String),
}
