//! HTTP client for the classification model endpoint.
//!
//! Sends `POST <url>` with the document as base64 JSON and validates the
//! structured answer before handing it to the routing policy.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use docroute_core::document::{ClassificationResult, DocCategory, ExtractedField};
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::mime;
use crate::Classifier;

/// Default model identifier sent with every request.
pub const DEFAULT_MODEL: &str = "document-router-v1";

/// Default bound on a single classification call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Characters of an error response body kept in [`ClassifierError::Rejected`].
pub const MAX_REJECTED_BODY_CHARS: usize = 256;

/// Cut `body` to [`MAX_REJECTED_BODY_CHARS`] characters, marking the cut.
fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_REJECTED_BODY_CHARS) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Full endpoint URL.
    pub url: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl ClassifierConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyRequest<'a> {
    model: &'a str,
    mime_type: &'a str,
    data: String,
    categories: Vec<&'static str>,
}

/// Response body as sent by the model. The category is kept as text so an
/// unexpected label degrades to `Other` instead of failing the document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyResponse {
    category: String,
    confidence: f64,
    #[serde(default)]
    extracted_fields: Vec<ExtractedField>,
    #[serde(default)]
    summary: String,
    routing_destination: String,
}

impl TryFrom<ClassifyResponse> for ClassificationResult {
    type Error = ClassifierError;

    fn try_from(raw: ClassifyResponse) -> Result<Self, Self::Error> {
        if !raw.confidence.is_finite() || !(0.0..=1.0).contains(&raw.confidence) {
            return Err(ClassifierError::Malformed(format!(
                "confidence must be within [0, 1], got {}",
                raw.confidence
            )));
        }
        if raw.routing_destination.trim().is_empty() {
            return Err(ClassifierError::Malformed(
                "routingDestination must not be empty".into(),
            ));
        }
        Ok(ClassificationResult {
            category: DocCategory::from_label_lenient(&raw.category),
            confidence: raw.confidence,
            extracted_fields: raw.extracted_fields,
            summary: raw.summary,
            routing_destination: raw.routing_destination,
        })
    }
}

/// [`Classifier`] backed by a remote JSON endpoint.
pub struct HttpClassifier {
    client: reqwest::Client,
    config: ClassifierConfig,
}

impl HttpClassifier {
    /// Build a client whose every request is bounded by `config.timeout`.
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassifierError::Setup(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ClassifierError {
        if e.is_timeout() {
            ClassifierError::Timeout(self.config.timeout)
        } else {
            ClassifierError::Unreachable(e.to_string())
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<ClassificationResult, ClassifierError> {
        if !mime::is_supported(mime_type) {
            return Err(ClassifierError::UnsupportedMimeType(mime_type.to_string()));
        }

        let essence = mime::essence(mime_type);
        let body = ClassifyRequest {
            model: &self.config.model,
            mime_type: &essence,
            data: STANDARD.encode(bytes),
            categories: DocCategory::ALL.iter().map(|c| c.as_str()).collect(),
        };

        let mut request = self.client.post(&self.config.url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(mime_type = %essence, size = bytes.len(), "Sending document to classifier");
        let response = request
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %text, "Classifier rejected request");
            return Err(ClassifierError::Rejected {
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }

        let raw: ClassifyResponse =
            serde_json::from_str(&text).map_err(|e| ClassifierError::Malformed(e.to_string()))?;
        let result = ClassificationResult::try_from(raw)?;
        tracing::debug!(
            category = %result.category,
            confidence = result.confidence,
            "Classifier returned result"
        );
        Ok(result)
    }
}
