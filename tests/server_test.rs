mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use cdm_classifier::{server, PredictionPipeline, ServiceConfig};
use common::{footer_json, StubClassifier};
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup_app() -> (Arc<StubClassifier>, Router) {
    let classifier = Arc::new(StubClassifier::new());
    let pipeline = PredictionPipeline::new(Arc::clone(&classifier), ServiceConfig::default());
    (classifier, server::router(pipeline))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, uri, Some("application/json"), body.to_string()).await
}

async fn post_raw(app: Router, uri: &str, content_type: Option<&str>, body: String) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder.body(Body::from(body)).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (_, app) = setup_app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "status": "ok", "model": "StubClassifier" }));
}

#[tokio::test]
async fn test_process_text() {
    let (_, app) = setup_app();
    let (status, body) = post_json(
        app,
        "/process_text",
        json!({ "content": { "text": "paciente con dolor abdominal", "footer": footer_json("N7") } }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let metadata = &body["nlp_output"]["record_metadata"];
    assert_eq!(metadata["clinical_site_id"], "P1");
    assert_eq!(metadata["patient_id"], "123");
    assert_eq!(metadata["record_format"], "json");
    assert_eq!(metadata["deidentified"], "no");
    assert_eq!(body["nlp_output"]["processing_success"], true);
    assert_eq!(body["nlp_service_info"]["service_language"], "es");
    assert_eq!(
        body["nlp_output"]["class_logits"],
        serde_json::to_value(StubClassifier::expected_logits("paciente con dolor abdominal")).unwrap()
    );
}

#[tokio::test]
async fn test_process_text_requires_content() {
    let (_, app) = setup_app();
    let (status, body) = post_json(app, "/process_text", json!({ "text": "fiebre" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Input must be a dictionary with 'content' key");

    let (_, app) = setup_app();
    let (status, _) = post_json(app, "/process_text", json!(["fiebre"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_process_text_requires_text() {
    let (classifier, app) = setup_app();
    let (status, body) = post_json(
        app,
        "/process_text",
        json!({ "content": { "text": "", "footer": footer_json("N7") } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "'text' is required");
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_process_text_missing_footer_key() {
    let (_, app) = setup_app();
    let mut footer = footer_json("N7");
    footer.as_object_mut().unwrap().remove("person_id");
    let (status, body) = post_json(
        app,
        "/process_text",
        json!({ "content": { "text": "fiebre", "footer": footer } }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("person_id"));
}

#[tokio::test]
async fn test_process_text_inference_failure() {
    let (_, app) = setup_app();
    let (status, body) = post_json(
        app,
        "/process_text",
        json!({ "content": { "text": "<fail>", "footer": footer_json("N7") } }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_process_bulk() {
    let (_, app) = setup_app();
    let (status, body) = post_json(
        app,
        "/process_bulk",
        json!({ "content": [
            { "text": "fever and cough", "footer": footer_json("N1") },
            { "text": "tos seca", "footer": footer_json("N2") }
        ] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let envelopes = body.as_array().unwrap();
    assert_eq!(envelopes.len(), 2);
    assert_eq!(envelopes[0]["nlp_output"]["record_metadata"]["record_id"], "N1");
    assert_eq!(envelopes[1]["nlp_output"]["record_metadata"]["record_id"], "N2");
}

#[tokio::test]
async fn test_process_bulk_fails_on_empty_item() {
    let (classifier, app) = setup_app();
    let (status, body) = post_json(
        app,
        "/process_bulk",
        json!({ "content": [
            { "text": "fever and cough", "footer": footer_json("N1") },
            { "text": "", "footer": footer_json("N2") }
        ] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Each item must contain 'text'" }));
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_process_bulk_requires_list() {
    let (_, app) = setup_app();
    let (status, body) = post_json(
        app,
        "/process_bulk",
        json!({ "content": { "text": "fever and cough" } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Input must be a list of objects");
}

#[tokio::test]
async fn test_malformed_body_returns_error_object() {
    for uri in ["/process_text", "/process_bulk"] {
        let (classifier, app) = setup_app();
        let (status, body) = post_raw(app, uri, Some("application/json"), "{not json".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Input must be a dictionary with 'content' key" }));
        assert_eq!(classifier.calls(), 0);
    }
}

#[tokio::test]
async fn test_missing_content_type_returns_error_object() {
    let request = json!({ "content": { "text": "fiebre", "footer": footer_json("N7") } });
    for uri in ["/process_text", "/process_bulk"] {
        let (classifier, app) = setup_app();
        let (status, body) = post_raw(app, uri, None, request.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Input must be a dictionary with 'content' key" }));
        assert_eq!(classifier.calls(), 0);
    }
}

#[tokio::test]
async fn test_process_text_without_text_key() {
    let (classifier, app) = setup_app();
    let (status, body) = post_json(
        app,
        "/process_text",
        json!({ "content": { "footer": footer_json("N7") } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "'text' is required" }));
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_process_text_non_object_footer() {
    let (_, app) = setup_app();
    let (status, body) = post_json(
        app,
        "/process_text",
        json!({ "content": { "text": "fiebre", "footer": "abc" } }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("not a JSON object"));
}

#[tokio::test]
async fn test_process_bulk_item_without_footer() {
    let (_, app) = setup_app();
    let (status, body) = post_json(
        app,
        "/process_bulk",
        json!({ "content": [
            { "text": "fever and cough", "footer": footer_json("N1") },
            { "text": "tos seca" }
        ] }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
    assert!(body.get("nlp_output").is_none());
}
