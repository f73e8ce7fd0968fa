use axum::routing::get;
use axum::Router;

use crate::handlers::logs;
use crate::state::AppState;

/// Routes mounted at `/logs`.
///
/// ```text
/// GET  /    -> most recent entries
/// POST /    -> append client event
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(logs::list_recent).post(logs::append))
}
