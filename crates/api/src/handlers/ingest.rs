//! Handlers for the `/ingest` resource.
//!
//! Each file becomes one pipeline run. Batch uploads run every file
//! independently and report one outcome per file, so a single failure never
//! fails the whole request.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use docroute_core::document::{DocumentRecord, Origin};
use docroute_core::types::DbId;
use docroute_pipeline::IngestRequest;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Mime type assumed when a file part has no `Content-Type`.
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Document name used when the client sends none, or only whitespace.
const FALLBACK_FILE_NAME: &str = "upload";

fn file_name_or_fallback(name: Option<&str>) -> String {
    name.map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_FILE_NAME)
        .to_string()
}

/// One uploaded `file` part.
struct UploadedFile {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

/// Parsed multipart body: every `file` part plus the optional `origin`.
struct UploadForm {
    files: Vec<UploadedFile>,
    origin: Origin,
}

impl UploadForm {
    fn into_requests(self, owner: DbId) -> Vec<IngestRequest> {
        let origin = self.origin;
        self.files
            .into_iter()
            .map(|file| IngestRequest {
                file_name: file.file_name,
                mime_type: file.mime_type,
                bytes: file.bytes,
                origin,
                owner,
            })
            .collect()
    }
}

async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut files = Vec::new();
    let mut origin = Origin::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = file_name_or_fallback(field.file_name());
                let mime_type = field
                    .content_type()
                    .unwrap_or(FALLBACK_MIME_TYPE)
                    .to_string();
                let bytes = field.bytes().await?.to_vec();
                files.push(UploadedFile {
                    file_name,
                    mime_type,
                    bytes,
                });
            }
            Some("origin") => {
                origin = field.text().await?.trim().parse()?;
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("Missing 'file' part".into()));
    }
    Ok(UploadForm { files, origin })
}

/// POST /api/v1/ingest
///
/// Classify, route and store one uploaded file.
pub async fn upload(
    auth: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<DocumentRecord>>)> {
    let form = read_upload_form(multipart).await?;
    if form.files.len() > 1 {
        return Err(AppError::BadRequest(
            "Expected exactly one 'file' part; use /ingest/batch for several".into(),
        ));
    }

    let request = form
        .into_requests(auth.user_id)
        .pop()
        .ok_or_else(|| AppError::BadRequest("Missing 'file' part".into()))?;

    let record = state.pipeline.ingest(request).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// Result of one file in a batch upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

/// POST /api/v1/ingest/batch
///
/// Run every uploaded file through its own pipeline instance concurrently.
/// Outcomes are returned in upload order.
pub async fn upload_batch(
    auth: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<Vec<BatchOutcome>>>> {
    let form = read_upload_form(multipart).await?;
    let requests = form.into_requests(auth.user_id);
    let file_names: Vec<String> = requests.iter().map(|r| r.file_name.clone()).collect();

    tracing::info!(files = requests.len(), user_id = %auth.user_id, "Batch ingestion started");
    let results = state.pipeline.ingest_batch(requests).await;

    let outcomes = file_names
        .into_iter()
        .zip(results)
        .map(|(file_name, result)| match result {
            Ok(document) => BatchOutcome {
                file_name,
                document: Some(document),
                error: None,
                code: None,
            },
            Err(e) => {
                let (_, code, message) = AppError::from(e).parts();
                BatchOutcome {
                    file_name,
                    document: None,
                    error: Some(message),
                    code: Some(code),
                }
            }
        })
        .collect();

    Ok(Json(DataResponse { data: outcomes }))
}

/// Inbound email carrying one attachment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailIngestRequest {
    /// Message id assigned by the mail provider.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub received_at: Option<String>,
    #[serde(default)]
    pub attachment_name: Option<String>,
    /// Base64 content, optionally as a `data:<mime>;base64,` URL.
    pub attachment_data: String,
    pub attachment_mime_type: String,
}

/// Decode attachment content, accepting either raw base64 or a data URL.
fn decode_attachment(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let data = data.trim();
    let encoded = match data.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, payload)| payload),
        None => data,
    };
    STANDARD.decode(encoded)
}

/// POST /api/v1/ingest/email
pub async fn email(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(message): ApiJson<EmailIngestRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<DocumentRecord>>)> {
    let bytes = decode_attachment(&message.attachment_data)
        .map_err(|e| AppError::BadRequest(format!("attachmentData is not valid base64: {e}")))?;
    let file_name = file_name_or_fallback(message.attachment_name.as_deref());

    tracing::info!(
        message_id = message.id.as_deref().unwrap_or("-"),
        from = message.from.as_deref().unwrap_or("-"),
        subject = message.subject.as_deref().unwrap_or("-"),
        received_at = message.received_at.as_deref().unwrap_or("-"),
        attachment = %file_name,
        "Email attachment received"
    );

    let record = state
        .pipeline
        .ingest(IngestRequest {
            file_name,
            mime_type: message.attachment_mime_type,
            bytes,
            origin: Origin::Email,
            owner: auth.user_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}
