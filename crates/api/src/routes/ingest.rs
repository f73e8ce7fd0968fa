//! Route definitions for the `/ingest` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::ingest;
use crate::state::AppState;

/// Routes mounted at `/ingest`.
///
/// ```text
/// POST /         -> ingest one uploaded file
/// POST /batch    -> ingest every uploaded file concurrently
/// POST /email    -> ingest an email attachment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(ingest::upload))
        .route("/batch", post(ingest::upload_batch))
        .route("/email", post(ingest::email))
}
