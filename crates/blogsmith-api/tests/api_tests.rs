//! API Integration Tests
//!
//! Author: hephaex@gmail.com

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use blogsmith_api::testing::TestHarness;
use blogsmith_api::{create_router, create_router_for_testing, state::AppState};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower::ServiceExt;

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn router(state: AppState) -> Router {
    create_router(Arc::new(state))
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let (status, json) = send_json(create_router_for_testing(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_check() {
    let (status, json) = send_json(create_router_for_testing(), get("/ready")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
    assert_eq!(json["checks"]["index_records"], 3);
    assert_eq!(json["checks"]["mail_configured"], true);
}

#[tokio::test]
async fn test_readiness_before_index_loaded() {
    let (status, json) = send_json(router(AppState::default()), get("/ready")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["ready"], false);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (status, json) = send_json(create_router_for_testing(), get("/metrics")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["uptime_seconds"].is_number());
    assert!(json["total_requests"].is_number());
    assert_eq!(json["index_records"], 3);
}

#[tokio::test]
async fn test_security_headers_present() {
    let response = create_router_for_testing()
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
}

// =============================================================================
// Blog Draft Tests
// =============================================================================

#[tokio::test]
async fn test_draft_success() {
    let harness = TestHarness::new();
    let request = create_json_request(
        "POST",
        "/api/blog-draft",
        Some(json!({"topic": "Lease extensions"})),
    );

    let (status, json) = send_json(router(harness.state()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["topic"], "Lease extensions");
    assert_eq!(json["blog"], "Headline\nIntro paragraph.\nWrap-up.");
    assert_eq!(json["emailed"], false);
    assert!(json["processing_time_ms"].is_number());

    let sources = json["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 3);
    assert_eq!(sources[0]["id"], "lease");
    assert_eq!(sources[0]["label"], "lease-extension.pdf");

    let prompts = harness.llm.prompts.lock().unwrap();
    assert!(prompts[0].contains("Lease extensions"));
    assert!(prompts[0].contains("• lease-extension.pdf"));
}

#[tokio::test]
async fn test_draft_missing_topic() {
    let bodies = [
        Some(json!({})),
        Some(json!({"topic": ""})),
        Some(json!({"topic": "   "})),
        Some(json!({"topic": 42})),
        None,
    ];

    for body in bodies {
        let harness = TestHarness::new();
        let request = create_json_request("POST", "/api/blog-draft", body);
        let (status, json) = send_json(router(harness.state()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({"error": "Missing topic", "code": "BAD_REQUEST"}));
        assert_eq!(harness.embedder.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_draft_llm_failure_is_generic_500() {
    let harness = TestHarness::new();
    harness.llm.fail.store(true, Ordering::SeqCst);

    let request = create_json_request(
        "POST",
        "/api/blog-draft",
        Some(json!({"topic": "Damp", "email": "reader@example.com"})),
    );
    let (status, json) = send_json(router(harness.state()), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json,
        json!({"error": "Blog generation failed", "code": "INTERNAL_ERROR"})
    );
    assert!(harness.mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_draft_index_mismatch_is_generic_500() {
    use blogsmith_core::VectorRecord;
    use blogsmith_rag::{BlogDrafter, DraftConfig};
    use blogsmith_vector::{Retriever, VectorIndex};

    // The stub embedder returns 3 dimensions; this index holds 2
    let harness = TestHarness::new();
    let index = VectorIndex::from_records(vec![VectorRecord::new("flat", vec![1.0, 0.0])]).unwrap();
    let retriever = Retriever::new(Arc::new(index), harness.embedder.clone());
    let drafter = BlogDrafter::new(Arc::new(retriever), harness.llm.clone(), DraftConfig::default());
    let state = Arc::new(AppState::new(harness.config.clone()).with_drafter(Arc::new(drafter)));

    let request = create_json_request(
        "POST",
        "/api/blog-draft",
        Some(json!({"topic": "Damp"})),
    );
    let (status, json) = send_json(create_router(state.clone()), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json,
        json!({"error": "Blog generation failed", "code": "INTERNAL_ERROR"})
    );
    assert_eq!(state.metrics.drafts_failed.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_draft_not_ready() {
    let request = create_json_request(
        "POST",
        "/api/blog-draft",
        Some(json!({"topic": "Damp"})),
    );
    let (status, json) = send_json(router(AppState::default()), request).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_draft_emails_attachments() {
    let harness = TestHarness::new();
    let request = create_json_request(
        "POST",
        "/api/blog-draft",
        Some(json!({"topic": "Party walls", "email": "reader@example.com"})),
    );

    let (status, json) = send_json(router(harness.state()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["emailed"], true);

    let sent = harness.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "reader@example.com");
    assert_eq!(sent[0].subject, "Your AI blog: Party walls");

    let filenames: Vec<&str> = sent[0]
        .attachments
        .iter()
        .map(|a| a.filename.as_str())
        .collect();
    assert_eq!(filenames, vec!["Party-walls.pdf", "Party-walls.docx"]);
    assert!(sent[0].attachments[0].data.starts_with(b"%PDF"));
    assert!(sent[0].attachments[1].data.starts_with(b"PK"));
}

#[tokio::test]
async fn test_draft_mail_failure_still_succeeds() {
    let harness = TestHarness::new();
    harness.mailer.fail.store(true, Ordering::SeqCst);

    let request = create_json_request(
        "POST",
        "/api/blog-draft",
        Some(json!({"topic": "Damp", "email": "reader@example.com"})),
    );
    let (status, json) = send_json(router(harness.state()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["emailed"], false);
    assert!(json["blog"].is_string());
}

#[tokio::test]
async fn test_draft_ignores_bad_address() {
    let harness = TestHarness::new();
    let request = create_json_request(
        "POST",
        "/api/blog-draft",
        Some(json!({"topic": "Damp", "email": "not-an-address"})),
    );
    let (status, json) = send_json(router(harness.state()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["emailed"], false);
    assert!(harness.mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_draft_without_mailer() {
    let harness = TestHarness::new();
    let request = create_json_request(
        "POST",
        "/api/blog-draft",
        Some(json!({"topic": "Damp", "email": "reader@example.com"})),
    );
    let (status, json) = send_json(router(harness.state_without_mail()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["emailed"], false);
}

#[tokio::test]
async fn test_draft_counts_in_metrics() {
    let harness = TestHarness::new();
    let state = Arc::new(harness.state());
    let app = create_router(state.clone());

    let request = create_json_request(
        "POST",
        "/api/blog-draft",
        Some(json!({"topic": "Damp"})),
    );
    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.metrics.drafts_generated.load(Ordering::Relaxed), 1);
    assert_eq!(state.get_request_count(), 1);
}

// =============================================================================
// Static Files and Docs
// =============================================================================

#[tokio::test]
async fn test_banner_without_index_page() {
    let mut state = TestHarness::new().state();
    state.config.server.static_dir = "/definitely/not/here".into();

    let (status, body) = send(router(state), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Blogsmith assistant is live.");
}

#[tokio::test]
async fn test_static_files_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Blog drafts</h1>").unwrap();
    std::fs::write(dir.path().join("script.js"), "console.log('hi');").unwrap();

    let mut state = TestHarness::new().state();
    state.config.server.static_dir = dir.path().to_path_buf();
    let app = router(state);

    let (status, body) = send(app.clone(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>Blog drafts</h1>");

    let (status, body) = send(app.clone(), get("/script.js")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"console.log('hi');");

    let (status, _) = send(app, get("/missing.css")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document() {
    let (status, json) =
        send_json(create_router_for_testing(), get("/api-docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/blog-draft"]["post"].is_object());
}
