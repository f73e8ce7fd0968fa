//! HTTP front end for document ingestion and routing.
//!
//! The binary in `main.rs` and the integration tests under `tests/` share
//! everything through this library target.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
