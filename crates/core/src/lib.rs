//! Domain types and pure logic for the document routing service.
//!
//! Everything in this crate is free of I/O so it can be shared by the
//! persistence layer, the ingestion pipeline and the HTTP server alike.

pub mod audit;
pub mod document;
pub mod error;
pub mod ids;
pub mod liveness;
pub mod roles;
pub mod routing;
pub mod settings;
pub mod types;
