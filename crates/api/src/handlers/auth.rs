//! Handlers for the `/auth` resource (signup, login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use docroute_core::audit::{event_names, Actor, LogLevel};
use docroute_core::error::CoreError;
use docroute_core::roles::DEFAULT_ROLE;
use docroute_db::models::user::{CreateUser, UserResponse};
use docroute_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for both `POST /auth/signup` and `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Create an `Operator` account. Duplicate emails are rejected with 409.
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let email = normalize_email(&input.email);
    if !email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "A valid email address is required".into(),
        )));
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            id: Uuid::now_v7(),
            email,
            password_hash,
            role: DEFAULT_ROLE.to_string(),
        },
    )
    .await?;

    state
        .audit
        .record(
            Actor::User(user.id),
            event_names::USER_SIGNUP,
            LogLevel::Info,
            json!({ "email": user.email }),
        )
        .await;

    tracing::info!(user_id = %user.id, "User signed up");
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password and return an access token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CredentialsRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = normalize_email(&input.email);

    let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? else {
        state
            .audit
            .record(
                Actor::System,
                event_names::AUTH_FAILURE,
                LogLevel::Warning,
                json!({ "email": email, "reason": "unknown_email" }),
            )
            .await;
        return Err(invalid_credentials());
    };

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        state
            .audit
            .record(
                Actor::User(user.id),
                event_names::AUTH_FAILURE,
                LogLevel::Warning,
                json!({ "email": email, "reason": "bad_password" }),
            )
            .await;
        return Err(invalid_credentials());
    }

    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    state
        .audit
        .record(
            Actor::User(user.id),
            event_names::AUTH_SUCCESS,
            LogLevel::Success,
            json!({ "email": email }),
        )
        .await;

    Ok(Json(AuthResponse {
        access_token,
        expires_in: state.config.jwt.expires_in_secs(),
        user: UserResponse::from(&user),
    }))
}
