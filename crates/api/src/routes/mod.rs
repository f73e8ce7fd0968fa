pub mod auth;
pub mod documents;
pub mod health;
pub mod ingest;
pub mod logs;
pub mod settings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                 create account (public)
/// /auth/login                  login (public)
///
/// /documents                   list (?userId), create
/// /documents/{id}              partial update (PATCH)
///
/// /ingest                      classify + route one file (multipart)
/// /ingest/batch                classify + route many files (multipart)
/// /ingest/email                classify + route an email attachment (JSON)
///
/// /logs                        recent entries, append client event
///
/// /settings                    get, update (update is admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/documents", documents::router())
        .nest("/ingest", ingest::router())
        .nest("/logs", logs::router())
        .nest("/settings", settings::router())
}
