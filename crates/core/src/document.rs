//! Document records, classifier output and partial updates.
//!
//! Labels used on the wire and in the database are the human-readable
//! category / status names (`"Legal Contract"`, `"Quarantined"`, ...), so the
//! same strings flow from the classifier through storage to API clients.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::settings::validate_unit_range;
use crate::types::{DbId, EpochMillis};

// ---------------------------------------------------------------------------
// Label enums
// ---------------------------------------------------------------------------

/// Closed set of document categories the classifier may assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocCategory {
    Invoice,
    Resume,
    #[serde(rename = "Legal Contract")]
    LegalContract,
    #[serde(rename = "ID/Passport")]
    Identification,
    Receipt,
    #[serde(rename = "Technical Doc")]
    Technical,
    Other,
}

impl DocCategory {
    pub const ALL: [DocCategory; 7] = [
        DocCategory::Invoice,
        DocCategory::Resume,
        DocCategory::LegalContract,
        DocCategory::Identification,
        DocCategory::Receipt,
        DocCategory::Technical,
        DocCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocCategory::Invoice => "Invoice",
            DocCategory::Resume => "Resume",
            DocCategory::LegalContract => "Legal Contract",
            DocCategory::Identification => "ID/Passport",
            DocCategory::Receipt => "Receipt",
            DocCategory::Technical => "Technical Doc",
            DocCategory::Other => "Other",
        }
    }

    /// Map a free-form model label onto a category, falling back to
    /// [`DocCategory::Other`]. Matching ignores case and surrounding space.
    pub fn from_label_lenient(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .unwrap_or(DocCategory::Other)
    }
}

impl fmt::Display for DocCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown document category '{s}'")))
    }
}

/// Lifecycle state of a document moving through ingestion.
///
/// `Pending` and `Processing` are transient and never persisted; `Failed`
/// is reported to the caller without a record being created. Only
/// `Quarantined` and `Routed` appear on stored documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoutingStatus {
    Pending,
    Processing,
    Quarantined,
    Routed,
    Failed,
}

impl RoutingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RoutingStatus::Pending => "Pending",
            RoutingStatus::Processing => "Processing",
            RoutingStatus::Quarantined => "Quarantined",
            RoutingStatus::Routed => "Routed",
            RoutingStatus::Failed => "Failed",
        }
    }

    /// Whether a stored document may carry this status.
    pub fn is_persistable(self) -> bool {
        matches!(self, RoutingStatus::Quarantined | RoutingStatus::Routed)
    }
}

impl fmt::Display for RoutingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RoutingStatus::Pending),
            "Processing" => Ok(RoutingStatus::Processing),
            "Quarantined" => Ok(RoutingStatus::Quarantined),
            "Routed" => Ok(RoutingStatus::Routed),
            "Failed" => Ok(RoutingStatus::Failed),
            other => Err(CoreError::Validation(format!(
                "Unknown routing status '{other}'"
            ))),
        }
    }
}

/// How a document entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Origin {
    #[default]
    Upload,
    Email,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Upload => "Upload",
            Origin::Email => "Email",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Origin {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Upload" => Ok(Origin::Upload),
            "Email" => Ok(Origin::Email),
            other => Err(CoreError::Validation(format!("Unknown origin '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier output
// ---------------------------------------------------------------------------

/// A single key/value pair pulled out of a document. Keys may repeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub key: String,
    pub value: String,
}

impl ExtractedField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Structured output of one classification call. Never persisted directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub category: DocCategory,
    pub confidence: f64,
    #[serde(default)]
    pub extracted_fields: Vec<ExtractedField>,
    #[serde(default)]
    pub summary: String,
    /// Destination suggested by the model; only honoured when routed.
    pub routing_destination: String,
}

// ---------------------------------------------------------------------------
// DocumentRecord
// ---------------------------------------------------------------------------

/// A classified, routed document as stored and served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: DbId,
    pub name: String,
    pub timestamp: EpochMillis,
    pub category: DocCategory,
    pub confidence: f64,
    pub status: RoutingStatus,
    #[serde(default)]
    pub extracted_fields: Vec<ExtractedField>,
    pub destination: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flagged_for_retraining: Option<bool>,
    pub origin: Origin,
    pub user_id: DbId,
}

impl DocumentRecord {
    /// Check the record-level invariants enforced before any write.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_unit_range(self.confidence, "confidence")?;
        if !self.status.is_persistable() {
            return Err(CoreError::Validation(format!(
                "A stored document cannot have status '{}'",
                self.status
            )));
        }
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("Document name must not be empty".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DocumentPatch
// ---------------------------------------------------------------------------

/// Partial update over the mutable fields of a [`DocumentRecord`].
///
/// `id`, `name`, `timestamp`, `origin` and `userId` are not representable
/// here; payloads naming them are rejected at deserialization.
///
/// `thumbnail` and `flaggedForRetraining` are nullable on the record, so
/// they distinguish "absent" (`None`) from "set to null" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DocumentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<DocCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RoutingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_fields: Option<Vec<ExtractedField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub flagged_for_retraining: Option<Option<bool>>,
}

/// Only called for keys present in the payload, so an explicit `null`
/// becomes `Some(None)` while a missing key stays `None` via `default`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl DocumentPatch {
    /// Names (wire spelling) of the fields this patch sets, in declaration order.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.category.is_some() {
            names.push("category");
        }
        if self.confidence.is_some() {
            names.push("confidence");
        }
        if self.status.is_some() {
            names.push("status");
        }
        if self.extracted_fields.is_some() {
            names.push("extractedFields");
        }
        if self.destination.is_some() {
            names.push("destination");
        }
        if self.summary.is_some() {
            names.push("summary");
        }
        if self.thumbnail.is_some() {
            names.push("thumbnail");
        }
        if self.flagged_for_retraining.is_some() {
            names.push("flaggedForRetraining");
        }
        names
    }

    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }

    /// Reject empty payloads and values that would break record invariants.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.is_empty() {
            return Err(CoreError::Validation("No updates provided".into()));
        }
        if let Some(confidence) = self.confidence {
            validate_unit_range(confidence, "confidence")?;
        }
        if let Some(status) = self.status {
            if !status.is_persistable() {
                return Err(CoreError::Validation(format!(
                    "status can only be set to Quarantined or Routed, got '{status}'"
                )));
            }
        }
        Ok(())
    }

    /// Overlay the set fields onto `record`, leaving every other field as is.
    pub fn apply_to(&self, record: &mut DocumentRecord) {
        if let Some(category) = self.category {
            record.category = category;
        }
        if let Some(confidence) = self.confidence {
            record.confidence = confidence;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(fields) = &self.extracted_fields {
            record.extracted_fields = fields.clone();
        }
        if let Some(destination) = &self.destination {
            record.destination = destination.clone();
        }
        if let Some(summary) = &self.summary {
            record.summary = summary.clone();
        }
        if let Some(thumbnail) = &self.thumbnail {
            record.thumbnail = thumbnail.clone();
        }
        if let Some(flagged) = self.flagged_for_retraining {
            record.flagged_for_retraining = flagged;
        }
    }
}
