//! Audit storage backends.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use docroute_core::audit::LogLevel;
use docroute_db::models::audit::CreateAuditLog;
use docroute_db::repositories::AuditLogRepo;
use docroute_db::DbPool;

use crate::error::AuditError;

/// One entry ready to be appended. The sink assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub user_id: String,
    pub event_name: String,
    pub log_level: LogLevel,
    pub payload: serde_json::Value,
}

/// Trait for audit storage backends.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append an entry. Entries are never updated or removed.
    async fn append(&self, entry: NewAuditEntry) -> Result<(), AuditError>;
}

/// Writes entries to `system_audit_logs`.
#[derive(Debug, Clone)]
pub struct PgAuditSink {
    pool: DbPool,
}

impl PgAuditSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn append(&self, entry: NewAuditEntry) -> Result<(), AuditError> {
        let row = CreateAuditLog {
            user_id: entry.user_id,
            event_name: entry.event_name,
            log_level: entry.log_level,
            payload_json: serde_json::to_string(&entry.payload)?,
        };
        AuditLogRepo::insert(&self.pool, &row).await?;
        Ok(())
    }
}

/// Keeps entries in memory in append order. Used by tests and local tooling.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<NewAuditEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far, oldest first.
    pub fn entries(&self) -> Vec<NewAuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Event names in append order.
    pub fn event_names(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .map(|e| e.event_name)
            .collect()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, entry: NewAuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
        Ok(())
    }
}
