#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use docroute_api::auth::jwt::JwtConfig;
use docroute_api::auth::password::hash_password;
use docroute_api::config::ServerConfig;
use docroute_api::router::build_app_router;
use docroute_api::state::AppState;
use docroute_classifier::{mime, Classifier, ClassifierConfig, ClassifierError};
use docroute_core::document::{ClassificationResult, DocCategory, ExtractedField};
use docroute_core::liveness::liveness_pair;
use docroute_core::settings::SystemSettings;
use docroute_db::models::user::{CreateUser, User};
use docroute_db::repositories::UserRepo;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";
pub const TEST_PASSWORD: &str = "correct-horse-battery";
const BOUNDARY: &str = "docroute-test-boundary";

// ---------------------------------------------------------------------------
// Classifier stub
// ---------------------------------------------------------------------------

/// Classifier that answers every supported mime type with a fixed result.
pub struct StubClassifier {
    pub confidence: f64,
    pub destination: String,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubClassifier {
    pub fn confident() -> Self {
        Self::with_confidence(0.95)
    }

    pub fn with_confidence(confidence: f64) -> Self {
        Self {
            confidence,
            destination: "Finance/AP".to_string(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::confident()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn classify(
        &self,
        _bytes: &[u8],
        mime_type: &str,
    ) -> Result<ClassificationResult, ClassifierError> {
        if !mime::is_supported(mime_type) {
            return Err(ClassifierError::UnsupportedMimeType(mime_type.to_string()));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClassifierError::Rejected {
                status: 500,
                body: "model exploded".into(),
            });
        }
        Ok(ClassificationResult {
            category: DocCategory::Invoice,
            confidence: self.confidence,
            extracted_fields: vec![ExtractedField::new("total", "42.00")],
            summary: "An invoice".into(),
            routing_destination: self.destination.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: String::new(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 10 * 1024 * 1024,
        health_probe_interval_secs: 10,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
        classifier: ClassifierConfig::new("http://classifier.invalid/v1/classify"),
        settings: SystemSettings::default(),
    }
}

/// Full application router over `pool`, backend online, confident classifier.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, Arc::new(StubClassifier::confident()), true)
}

/// Same middleware stack as production, with an injected classifier and a
/// fixed liveness flag.
pub fn build_test_app_with(pool: PgPool, classifier: Arc<dyn Classifier>, live: bool) -> Router {
    let config = test_config();
    let (_setter, liveness) = liveness_pair(live);
    let state = AppState::new(pool, Arc::new(config.clone()), classifier, liveness)
        .expect("test settings are valid");
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] directly into the database.
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            id: Uuid::now_v7(),
            email: email.to_string(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
}

/// Log in through the API and return the access token.
pub async fn login(app: Router, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["access_token"].as_str().unwrap().to_string()
}

/// Create a user with `role` and return its id plus a fresh access token.
pub async fn user_with_token(pool: &PgPool, app: Router, email: &str, role: &str) -> (Uuid, String) {
    let user = create_user(pool, email, role).await;
    let token = login(app, email).await;
    (user.id, token)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::PATCH, uri, Some(token), body)).await
}

/// A part of a `multipart/form-data` body.
pub enum Part<'a> {
    File {
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    token: &str,
    parts: &[Part<'_>],
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}
