//! HTTP-level tests for the `/ingest` endpoints.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use common::{body_json, post_json_auth, post_multipart_auth, Part, StubClassifier};
use docroute_core::audit::event_names;
use docroute_core::roles::ROLE_OPERATOR;
use docroute_db::repositories::{AuditLogRepo, DocumentRepo};
use serde_json::json;
use sqlx::PgPool;

fn pdf(name: &str) -> Part<'_> {
    Part::File {
        file_name: name,
        content_type: "application/pdf",
        bytes: b"%PDF-1.7 fake",
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn confident_upload_is_routed_and_stored(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (owner, token) =
        common::user_with_token(&pool, app.clone(), "up@example.com", ROLE_OPERATOR).await;

    let response = post_multipart_auth(app, "/api/v1/ingest", &token, &[pdf("invoice.pdf")]).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let doc = &json["data"];
    assert_eq!(doc["name"], "invoice.pdf");
    assert_eq!(doc["status"], "Routed");
    assert_eq!(doc["destination"], "Finance/AP");
    assert_eq!(doc["origin"], "Upload");
    assert_eq!(doc["userId"], owner.to_string());
    assert!(doc.get("thumbnail").is_none());

    let listed = DocumentRepo::list_by_owner(&pool, owner).await.unwrap();
    assert_eq!(listed.len(), 1);

    for event in [event_names::FILE_INGEST_START, event_names::CLASSIFICATION_FINISH] {
        assert_eq!(AuditLogRepo::count_by_event(&pool, event).await.unwrap(), 1, "{event}");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn low_confidence_upload_is_quarantined(pool: PgPool) {
    let app = common::build_test_app_with(
        pool.clone(),
        Arc::new(StubClassifier::with_confidence(0.62)),
        true,
    );
    let (_, token) =
        common::user_with_token(&pool, app.clone(), "q@example.com", ROLE_OPERATOR).await;

    let response = post_multipart_auth(app, "/api/v1/ingest", &token, &[pdf("blurry.pdf")]).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "Quarantined");
    assert_eq!(json["data"]["destination"], "Unknown/Review Queue");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn image_upload_carries_thumbnail_and_origin(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) =
        common::user_with_token(&pool, app.clone(), "img@example.com", ROLE_OPERATOR).await;

    let parts = [
        Part::File {
            file_name: "receipt.png",
            content_type: "image/png",
            bytes: b"hi",
        },
        Part::Text {
            name: "origin",
            value: "Email",
        },
    ];
    let response = post_multipart_auth(app, "/api/v1/ingest", &token, &parts).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["thumbnail"], "data:image/png;base64,aGk=");
    assert_eq!(json["data"]["origin"], "Email");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn offline_backend_refuses_with_503_and_no_audit(pool: PgPool) {
    let classifier = Arc::new(StubClassifier::confident());
    let app = common::build_test_app_with(pool.clone(), classifier.clone(), false);
    let (_, token) =
        common::user_with_token(&pool, app.clone(), "off@example.com", ROLE_OPERATOR).await;

    let response = post_multipart_auth(app, "/api/v1/ingest", &token, &[pdf("a.pdf")]).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "SERVICE_UNAVAILABLE");

    assert_eq!(classifier.calls(), 0);
    let starts = AuditLogRepo::count_by_event(&pool, event_names::FILE_INGEST_START)
        .await
        .unwrap();
    assert_eq!(starts, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn classifier_failure_is_502_and_nothing_is_stored(pool: PgPool) {
    let app = common::build_test_app_with(pool.clone(), Arc::new(StubClassifier::failing()), true);
    let (owner, token) =
        common::user_with_token(&pool, app.clone(), "fail@example.com", ROLE_OPERATOR).await;

    let response = post_multipart_auth(app, "/api/v1/ingest", &token, &[pdf("a.pdf")]).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "CLASSIFIER_ERROR");

    assert!(DocumentRepo::list_by_owner(&pool, owner).await.unwrap().is_empty());
    let failures = AuditLogRepo::count_by_event(&pool, event_names::API_CRITICAL_FAILURE)
        .await
        .unwrap();
    assert_eq!(failures, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unsupported_mime_type_is_415(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) =
        common::user_with_token(&pool, app.clone(), "mime@example.com", ROLE_OPERATOR).await;

    let parts = [Part::File {
        file_name: "clip.mp4",
        content_type: "video/mp4",
        bytes: b"\x00\x00",
    }];
    let response = post_multipart_auth(app, "/api/v1/ingest", &token, &parts).await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_file_part_is_400(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) =
        common::user_with_token(&pool, app.clone(), "nofile@example.com", ROLE_OPERATOR).await;

    let parts = [Part::Text {
        name: "origin",
        value: "Upload",
    }];
    let response = post_multipart_auth(app, "/api/v1/ingest", &token, &parts).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn batch_reports_one_outcome_per_file_in_order(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (owner, token) =
        common::user_with_token(&pool, app.clone(), "batch@example.com", ROLE_OPERATOR).await;

    let parts = [
        pdf("one.pdf"),
        Part::File {
            file_name: "two.exe",
            content_type: "application/x-msdownload",
            bytes: b"MZ",
        },
        pdf("three.pdf"),
    ];
    let response = post_multipart_auth(app, "/api/v1/ingest/batch", &token, &parts).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let outcomes = json["data"].as_array().unwrap();
    let names: Vec<&str> = outcomes
        .iter()
        .map(|o| o["fileName"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["one.pdf", "two.exe", "three.pdf"]);

    assert_eq!(outcomes[0]["document"]["status"], "Routed");
    assert_eq!(outcomes[1]["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert!(outcomes[1].get("document").is_none());
    assert_eq!(outcomes[2]["document"]["status"], "Routed");

    let stored = DocumentRepo::list_by_owner(&pool, owner).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_ne!(stored[0].id, stored[1].id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn email_attachment_is_ingested_with_email_origin(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) =
        common::user_with_token(&pool, app.clone(), "mail@example.com", ROLE_OPERATOR).await;

    let body = json!({
        "id": "msg-001",
        "from": "billing@supplier.test",
        "subject": "Invoice March",
        "receivedAt": "2026-03-01T09:00:00Z",
        "attachmentName": "march.pdf",
        "attachmentData": format!("data:application/pdf;base64,{}", STANDARD.encode(b"%PDF")),
        "attachmentMimeType": "application/pdf",
    });
    let response = post_json_auth(app, "/api/v1/ingest/email", &token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "march.pdf");
    assert_eq!(json["data"]["origin"], "Email");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn email_with_invalid_base64_is_400(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) =
        common::user_with_token(&pool, app.clone(), "badmail@example.com", ROLE_OPERATOR).await;

    let body = json!({
        "attachmentName": "x.pdf",
        "attachmentData": "***not base64***",
        "attachmentMimeType": "application/pdf",
    });
    let response = post_json_auth(app, "/api/v1/ingest/email", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn email_with_blank_attachment_name_uses_fallback(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) =
        common::user_with_token(&pool, app.clone(), "noname@example.com", ROLE_OPERATOR).await;

    let body = json!({
        "attachmentName": "  ",
        "attachmentData": STANDARD.encode(b"%PDF"),
        "attachmentMimeType": "application/pdf",
    });
    let response = post_json_auth(app, "/api/v1/ingest/email", &token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["name"], "upload");

    let failures = AuditLogRepo::count_by_event(&pool, event_names::API_CRITICAL_FAILURE)
        .await
        .unwrap();
    assert_eq!(failures, 0);
}
