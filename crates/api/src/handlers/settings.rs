//! Handlers for the `/settings` resource.

use axum::extract::State;
use axum::Json;
use docroute_core::audit::{event_names, LogLevel};
use docroute_core::settings::{SettingsUpdate, SystemSettings};
use serde_json::json;

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/settings
pub async fn get_settings(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Json<DataResponse<SystemSettings>> {
    Json(DataResponse {
        data: state.settings.snapshot(),
    })
}

/// PATCH /api/v1/settings
///
/// Takes effect for the next routing decision. Administrator only.
pub async fn update_settings(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(update): ApiJson<SettingsUpdate>,
) -> AppResult<Json<DataResponse<SystemSettings>>> {
    let updated = state.settings.apply(update)?;

    state
        .audit
        .record(
            admin.actor(),
            event_names::SETTINGS_UPDATE,
            LogLevel::Info,
            json!({ "settings": updated }),
        )
        .await;

    tracing::info!(
        confidence_threshold = updated.confidence_threshold,
        auto_routing_enabled = updated.auto_routing_enabled,
        default_destination = %updated.default_destination,
        "Settings updated"
    );
    Ok(Json(DataResponse { data: updated }))
}
