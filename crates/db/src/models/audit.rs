//! Audit log entity models and DTOs.
//!
//! Entries are immutable once created, so there is no update DTO.

use docroute_core::audit::LogLevel;
use docroute_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A single row of `system_audit_logs`.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub log_id: DbId,
    pub user_id: String,
    pub timestamp: Timestamp,
    pub event_name: String,
    pub log_level: String,
    pub payload_json: String,
}

impl AuditLog {
    /// Stored payload parsed back into JSON. Text that is not valid JSON is
    /// returned as a JSON string.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::from_str(&self.payload_json)
            .unwrap_or_else(|_| serde_json::Value::String(self.payload_json.clone()))
    }
}

/// DTO for appending an entry. Id and timestamp come from the database.
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub user_id: String,
    pub event_name: String,
    pub log_level: LogLevel,
    pub payload_json: String,
}
