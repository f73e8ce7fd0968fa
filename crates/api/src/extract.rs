//! Request extractors with JSON error bodies.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejection renders as an [`AppError`].
///
/// Malformed bodies and unknown fields on `deny_unknown_fields` types come
/// back as 400 `BAD_REQUEST` in the usual `{error, code}` shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
