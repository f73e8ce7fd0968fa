//! `/auth`: account creation and credential exchange. Both are public.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth::{login, signup};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}
