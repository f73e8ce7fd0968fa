//! Handlers for the `/logs` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use docroute_core::audit::{redact_sensitive_fields, LogLevel, RECENT_LOG_LIMIT};
use docroute_core::error::CoreError;
use docroute_core::types::{DbId, Timestamp};
use docroute_db::models::audit::{AuditLog, CreateAuditLog};
use docroute_db::repositories::AuditLogRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /logs`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendLogRequest {
    pub event_name: String,
    pub log_level: LogLevel,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// An audit entry with its payload parsed back into JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogView {
    pub log_id: DbId,
    pub user_id: String,
    pub timestamp: Timestamp,
    pub event_name: String,
    pub log_level: String,
    pub payload: serde_json::Value,
}

impl From<AuditLog> for AuditLogView {
    fn from(log: AuditLog) -> Self {
        let payload = log.payload();
        Self {
            log_id: log.log_id,
            user_id: log.user_id,
            timestamp: log.timestamp,
            event_name: log.event_name,
            log_level: log.log_level,
            payload,
        }
    }
}

/// POST /api/v1/logs
///
/// Append a client-side event attributed to the caller. Unlike the
/// service's own audit writes, a failure here is returned to the client.
pub async fn append(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<AppendLogRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AuditLogView>>)> {
    let event_name = input.event_name.trim();
    if event_name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "eventName must not be empty".into(),
        )));
    }

    let payload_json = serde_json::to_string(&redact_sensitive_fields(&input.payload))
        .map_err(|e| AppError::InternalError(format!("Payload serialization error: {e}")))?;

    let entry = AuditLogRepo::insert(
        &state.pool,
        &CreateAuditLog {
            user_id: auth.actor().to_string(),
            event_name: event_name.to_string(),
            log_level: input.log_level,
            payload_json,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: entry.into() })))
}

/// GET /api/v1/logs
///
/// The most recent entries, newest first.
pub async fn list_recent(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<AuditLogView>>>> {
    let entries = AuditLogRepo::list_recent(&state.pool, RECENT_LOG_LIMIT).await?;
    Ok(Json(DataResponse {
        data: entries.into_iter().map(AuditLogView::from).collect(),
    }))
}
