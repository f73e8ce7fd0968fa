use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Routes mounted at `/settings`.
///
/// ```text
/// GET   /   -> current settings
/// PATCH /   -> update (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(settings::get_settings).patch(settings::update_settings))
}
