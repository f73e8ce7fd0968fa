//! Repository for the append-only `system_audit_logs` table.

use sqlx::PgPool;

use crate::models::audit::{AuditLog, CreateAuditLog};

/// Column list for `system_audit_logs` SELECT queries.
const COLUMNS: &str = "log_id, user_id, timestamp, event_name, log_level, payload_json";

/// Provides insert and recent-entry queries for audit logs. There is no
/// update or delete.
pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Append one entry. `log_id` and `timestamp` are assigned by the database.
    pub async fn insert(pool: &PgPool, entry: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO system_audit_logs (user_id, event_name, log_level, payload_json)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(&entry.user_id)
            .bind(&entry.event_name)
            .bind(entry.log_level.as_str())
            .bind(&entry.payload_json)
            .fetch_one(pool)
            .await
    }

    /// The `limit` most recent entries, newest first by server timestamp.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM system_audit_logs
             ORDER BY timestamp DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Count entries with the given event name.
    pub async fn count_by_event(pool: &PgPool, event_name: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM system_audit_logs WHERE event_name = $1",
        )
        .bind(event_name)
        .fetch_one(pool)
        .await
    }
}
