//! Route definitions for the `/documents` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Routes mounted at `/documents`.
///
/// ```text
/// GET   /        -> list (?userId, defaults to caller)
/// POST  /        -> create
/// PATCH /{id}    -> partial update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(documents::list).post(documents::create))
        .route("/{id}", patch(documents::update))
}
