//! Best-effort audit recorder.

use std::sync::Arc;

use docroute_core::audit::{redact_sensitive_fields, Actor, LogLevel};

use crate::sink::{AuditSink, NewAuditEntry};

/// Front door to the audit log.
///
/// [`record`](Self::record) awaits the write so entries land in the order
/// the caller emits them, but its result is always `()`: a sink failure is
/// reported through `tracing` and otherwise ignored.
#[derive(Clone)]
pub struct AuditTrail {
    sink: Arc<dyn AuditSink>,
}

impl AuditTrail {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Append one entry, redacting sensitive payload keys first.
    pub async fn record(
        &self,
        actor: Actor,
        event_name: &str,
        level: LogLevel,
        payload: serde_json::Value,
    ) {
        let entry = NewAuditEntry {
            user_id: actor.to_string(),
            event_name: event_name.to_string(),
            log_level: level,
            payload: redact_sensitive_fields(&payload),
        };

        if let Err(e) = self.sink.append(entry).await {
            tracing::error!(
                error = %e,
                event_name,
                level = %level,
                "Failed to write audit entry"
            );
        }
    }
}

impl std::fmt::Debug for AuditTrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditTrail").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use docroute_core::audit::event_names;
    use serde_json::json;

    use super::*;
    use crate::error::AuditError;
    use crate::sink::MemoryAuditSink;

    struct FailingSink {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn append(&self, _entry: NewAuditEntry) -> Result<(), AuditError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(AuditError::Unavailable("disk on fire".into()))
        }
    }

    #[tokio::test]
    async fn records_entry_with_actor_and_level() {
        let sink = Arc::new(MemoryAuditSink::new());
        let trail = AuditTrail::new(sink.clone());
        let user = uuid::Uuid::now_v7();

        trail
            .record(
                Actor::User(user),
                event_names::FILE_INGEST_START,
                LogLevel::Info,
                json!({"fileName": "invoice.pdf"}),
            )
            .await;

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, user.to_string());
        assert_eq!(entries[0].event_name, "FILE_INGEST_START");
        assert_eq!(entries[0].log_level, LogLevel::Info);
        assert_eq!(entries[0].payload["fileName"], "invoice.pdf");
    }

    #[tokio::test]
    async fn system_actor_uses_sentinel() {
        let sink = Arc::new(MemoryAuditSink::new());
        let trail = AuditTrail::new(sink.clone());

        trail
            .record(Actor::System, "BOOT", LogLevel::Info, json!({}))
            .await;

        assert_eq!(sink.entries()[0].user_id, "system");
    }

    #[tokio::test]
    async fn payload_is_redacted_before_storage() {
        let sink = Arc::new(MemoryAuditSink::new());
        let trail = AuditTrail::new(sink.clone());

        trail
            .record(
                Actor::System,
                event_names::AUTH_FAILURE,
                LogLevel::Warning,
                json!({"email": "a@b.c", "password": "hunter22"}),
            )
            .await;

        let payload = &sink.entries()[0].payload;
        assert_eq!(payload["email"], "a@b.c");
        assert_eq!(payload["password"], "[REDACTED]");
    }

    #[tokio::test]
    async fn failing_sink_never_raises() {
        let sink = Arc::new(FailingSink {
            attempts: AtomicUsize::new(0),
        });
        let trail = AuditTrail::new(sink.clone());

        // `record` returns `()`; reaching the assertions is the contract.
        trail
            .record(Actor::System, "ANY", LogLevel::Error, json!({"x": 1}))
            .await;
        trail
            .record(Actor::System, "ANY", LogLevel::Error, json!({"x": 2}))
            .await;

        assert_eq!(sink.attempts.load(Ordering::SeqCst), 2);
    }
}
