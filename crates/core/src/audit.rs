//! Audit trail vocabulary and helpers.
//!
//! This module lives in `core` so the pipeline, the repositories and the HTTP
//! layer all agree on event names, severity levels and payload redaction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

/// Known event names. The column is free-form, these are the ones the
/// service itself emits.
pub mod event_names {
    pub const FILE_INGEST_START: &str = "FILE_INGEST_START";
    pub const CLASSIFICATION_FINISH: &str = "CLASSIFICATION_FINISH";
    pub const API_CRITICAL_FAILURE: &str = "API_CRITICAL_FAILURE";
    pub const DOCUMENT_UPDATE: &str = "DOCUMENT_UPDATE";
    pub const DOCUMENT_CREATE: &str = "DOCUMENT_CREATE";
    pub const AUTH_SUCCESS: &str = "AUTH_SUCCESS";
    pub const AUTH_FAILURE: &str = "AUTH_FAILURE";
    pub const USER_SIGNUP: &str = "USER_SIGNUP";
    pub const SETTINGS_UPDATE: &str = "SETTINGS_UPDATE";
}

/// Maximum number of entries returned by a recent-logs query.
pub const RECENT_LOG_LIMIT: i64 = 50;

/// Identity recorded when no user context exists.
pub const SYSTEM_ACTOR: &str = "system";

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INFO" => Ok(Self::Info),
            "SUCCESS" => Ok(Self::Success),
            "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            other => Err(CoreError::Validation(format!(
                "Unknown log level '{other}'. Must be one of: INFO, SUCCESS, WARNING, ERROR"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// Who caused an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    User(Uuid),
    System,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "{id}"),
            Self::System => f.write_str(SYSTEM_ACTOR),
        }
    }
}

impl From<Option<Uuid>> for Actor {
    fn from(id: Option<Uuid>) -> Self {
        id.map_or(Self::System, Self::User)
    }
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Key fragments whose values are never written to the audit trail.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "api_key",
    "authorization",
    "credential",
];

/// Replace the value of any object key containing one of
/// [`SENSITIVE_FIELDS`] (case-insensitive) with `"[REDACTED]"`, recursing
/// into nested objects and arrays.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}
