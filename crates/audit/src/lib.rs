//! Append-only audit trail.
//!
//! [`AuditSink`] is the storage seam (PostgreSQL in production, memory in
//! tests). [`AuditTrail`] sits in front of it and is fire-and-forget: a
//! failed write is logged and dropped, never returned to the caller.

pub mod error;
pub mod sink;
pub mod trail;

pub use error::AuditError;
pub use sink::{AuditSink, MemoryAuditSink, NewAuditEntry, PgAuditSink};
pub use trail::AuditTrail;
