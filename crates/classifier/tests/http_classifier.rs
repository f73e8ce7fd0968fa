//! HTTP classifier against a mock model endpoint.

use std::time::Duration;

use assert_matches::assert_matches;
use docroute_classifier::http::MAX_REJECTED_BODY_CHARS;
use docroute_classifier::{Classifier, ClassifierConfig, ClassifierError, HttpClassifier};
use docroute_core::document::DocCategory;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn classifier_for(server: &MockServer) -> HttpClassifier {
    let mut config = ClassifierConfig::new(format!("{}/classify", server.uri()));
    config.api_key = Some("test-key".into());
    config.timeout = Duration::from_secs(2);
    HttpClassifier::new(config).unwrap()
}

#[tokio::test]
async fn successful_classification_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/classify"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "document-router-v1",
            "mimeType": "application/pdf",
            "data": "JVBERi0=",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "category": "Invoice",
            "confidence": 0.95,
            "extractedFields": [
                {"key": "Vendor", "value": "Acme Corp"},
                {"key": "Total", "value": "$1,200.00"}
            ],
            "summary": "Invoice for consulting services",
            "routingDestination": "Finance/AP"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = classifier_for(&server)
        .classify(b"%PDF-", "application/pdf")
        .await
        .unwrap();

    assert_eq!(result.category, DocCategory::Invoice);
    assert_eq!(result.confidence, 0.95);
    assert_eq!(result.extracted_fields.len(), 2);
    assert_eq!(result.routing_destination, "Finance/AP");
}

#[tokio::test]
async fn unsupported_mime_type_never_hits_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = classifier_for(&server)
        .classify(b"PK\x03\x04", "application/zip")
        .await
        .unwrap_err();

    assert_matches!(err, ClassifierError::UnsupportedMimeType(m) if m == "application/zip");
}

#[tokio::test]
async fn non_success_status_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let err = classifier_for(&server)
        .classify(b"hello", "text/plain")
        .await
        .unwrap_err();

    assert_matches!(err, ClassifierError::Rejected { status: 429, body } if body == "quota exceeded");
}

#[tokio::test]
async fn huge_rejection_body_is_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(100_000)))
        .mount(&server)
        .await;

    let err = classifier_for(&server)
        .classify(b"hello", "text/plain")
        .await
        .unwrap_err();

    assert_matches!(
        err,
        ClassifierError::Rejected { status: 500, body }
            if body.len() <= MAX_REJECTED_BODY_CHARS + 3
    );
}

#[tokio::test]
async fn invalid_json_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = classifier_for(&server)
        .classify(b"hello", "text/plain")
        .await
        .unwrap_err();

    assert_matches!(err, ClassifierError::Malformed(_));
}

#[tokio::test]
async fn unknown_category_label_becomes_other() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "category": "Restaurant Menu",
            "confidence": 0.4,
            "routingDestination": "Misc"
        })))
        .mount(&server)
        .await;

    let result = classifier_for(&server)
        .classify(b"<html></html>", "text/html; charset=utf-8")
        .await
        .unwrap();

    assert_eq!(result.category, DocCategory::Other);
    assert!(result.extracted_fields.is_empty());
    assert_eq!(result.summary, "");
}

#[tokio::test]
async fn slow_model_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    let mut config = ClassifierConfig::new(server.uri());
    config.timeout = Duration::from_millis(200);
    let classifier = HttpClassifier::new(config).unwrap();

    let err = classifier.classify(b"x", "image/png").await.unwrap_err();
    assert_matches!(err, ClassifierError::Timeout(_));
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let classifier = HttpClassifier::new(ClassifierConfig::new(uri)).unwrap();
    let err = classifier.classify(b"x", "image/jpeg").await.unwrap_err();
    assert_matches!(err, ClassifierError::Unreachable(_));
}
