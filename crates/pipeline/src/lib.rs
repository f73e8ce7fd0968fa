//! Document ingestion pipeline.
//!
//! - [`store`]: persistence seam for document records.
//! - [`monitor`]: periodic connectivity probe that owns the liveness flag.
//! - [`ingest`]: classify, route, persist and audit one document at a time.

pub mod error;
pub mod ingest;
pub mod monitor;
pub mod store;

pub use error::PipelineError;
pub use ingest::{Clock, IngestRequest, IngestionPipeline, UpdateScope};
pub use monitor::{ConnectivityMonitor, HealthProbe, HttpHealthProbe, PgHealthProbe};
pub use store::{DocumentStore, MemoryDocumentStore, PgDocumentStore, StoreError};
