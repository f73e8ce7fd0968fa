//! Unauthenticated liveness endpoint, mounted outside `/api/v1`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"online"`; reaching the handler is the signal.
    pub status: &'static str,
    pub version: &'static str,
    /// Result of a `SELECT 1` made for this request.
    pub db_connected: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_connected = match docroute_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Json(HealthResponse {
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        db_connected,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
