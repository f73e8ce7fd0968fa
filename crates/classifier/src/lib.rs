//! Gateway to the external document classification model.
//!
//! The rest of the service sees only the [`Classifier`] trait: raw bytes and
//! a mime type in, a [`ClassificationResult`] or a [`ClassifierError`] out.
//! [`HttpClassifier`] is the production implementation.

use async_trait::async_trait;
use docroute_core::document::ClassificationResult;

pub mod error;
pub mod http;
pub mod mime;

pub use error::ClassifierError;
pub use http::{ClassifierConfig, HttpClassifier};

/// One classification per document, request/response.
///
/// Implementations may take tens of seconds; callers should not hold locks
/// across the call.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<ClassificationResult, ClassifierError>;
}
