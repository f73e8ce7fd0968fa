//! Handlers for the `/documents` resource.
//!
//! Reads and creates go straight to the document store. Partial updates go
//! through the pipeline so that each one is audited exactly once.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use docroute_core::audit::{event_names, LogLevel};
use docroute_core::document::{DocumentPatch, DocumentRecord};
use docroute_core::error::CoreError;
use docroute_core::types::DbId;
use docroute_pipeline::UpdateScope;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /documents`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsParams {
    /// Owner whose documents to list. Defaults to the caller.
    pub user_id: Option<DbId>,
}

/// GET /api/v1/documents?userId=
///
/// Newest first. Listing another user's documents requires `Administrator`.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListDocumentsParams>,
) -> AppResult<Json<DataResponse<Vec<DocumentRecord>>>> {
    let owner = params.user_id.unwrap_or(auth.user_id);
    if owner != auth.user_id && !auth.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Cannot list another user's documents".into(),
        )));
    }

    let documents = state.pipeline.store().list_by_owner(owner).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// POST /api/v1/documents
///
/// Store a complete, already-finalized record owned by the caller.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(record): ApiJson<DocumentRecord>,
) -> AppResult<(StatusCode, Json<DataResponse<DocumentRecord>>)> {
    if record.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Documents can only be created for the calling user".into(),
        )));
    }
    record.validate()?;

    state.pipeline.store().create(&record).await?;

    state
        .audit
        .record(
            auth.actor(),
            event_names::DOCUMENT_CREATE,
            LogLevel::Success,
            json!({ "id": record.id }),
        )
        .await;

    tracing::info!(document_id = %record.id, user_id = %auth.user_id, "Document created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// PATCH /api/v1/documents/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ApiJson(patch): ApiJson<DocumentPatch>,
) -> AppResult<Json<DataResponse<DocumentRecord>>> {
    let scope = if auth.is_admin() {
        UpdateScope::Any
    } else {
        UpdateScope::OwnedBy(auth.user_id)
    };

    let updated = state
        .pipeline
        .apply_update(auth.actor(), scope, id, patch)
        .await?;
    Ok(Json(DataResponse { data: updated }))
}
