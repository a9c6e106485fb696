//! HTTP surface tests for mimird's router, driven through `tower::oneshot`.
#![cfg(feature = "server")]

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{MockProvider, upstream};
use mimir::server::{
    Environment, GENERIC_FAILURE_MESSAGE, ServiceOptions, derived_body_limit, router,
};
use mimir::{FallbackOrchestrator, Mimir, RequestLimits, RetryConfig};

const ANALYSIS_JSON: &str = r#"```json
{"quality_score": 7, "issues": [], "summary": "Looks fine", "recommendations": []}
```"#;

fn gateway(providers: Vec<(MockProvider, u32)>) -> FallbackOrchestrator {
    let mut builder = Mimir::builder().retry(RetryConfig::disabled());
    for (provider, priority) in providers {
        builder = builder.provider(Arc::new(provider), priority);
    }
    builder.build().unwrap()
}

fn app(providers: Vec<(MockProvider, u32)>, options: ServiceOptions) -> Router {
    router(Arc::new(gateway(providers)), options)
}

fn dev_app(providers: Vec<(MockProvider, u32)>) -> Router {
    app(providers, ServiceOptions::default())
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// ============================================================================
// /analyze
// ============================================================================

#[tokio::test]
async fn analyze_returns_attributed_outcome() {
    let app = dev_app(vec![(MockProvider::replying("gemini", ANALYSIS_JSON), 1)]);

    let (status, body) = send(
        app,
        post(
            "/analyze",
            json!({"code": "const x = 1;", "language": "TS", "analysisType": "security"})
                .to_string(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["provider"], "gemini");
    assert_eq!(data["analysis"], ANALYSIS_JSON);
    assert_eq!(data["metadata"]["language"], "typescript");
    assert_eq!(data["metadata"]["analysisType"], "security");
    assert!(data["metadata"]["timestamp"].is_string());
}

#[tokio::test]
async fn analyze_honors_preferred_provider() {
    let app = dev_app(vec![
        (MockProvider::replying("gemini", "from gemini"), 1),
        (MockProvider::replying("openai", "from openai"), 2),
    ]);

    let (status, body) = send(
        app,
        post(
            "/analyze",
            json!({"code": "x", "preferredProvider": "OpenAI"}).to_string(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["provider"], "openai");
}

#[tokio::test]
async fn blank_code_is_a_validation_error() {
    let provider = Arc::new(MockProvider::replying("gemini", "unused"));
    let gateway = Mimir::builder()
        .provider(provider.clone(), 1)
        .build()
        .unwrap();
    let app = router(Arc::new(gateway), ServiceOptions::default());

    let (status, body) = send(app, post("/analyze", r#"{"code": "   "}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Validation Error",
            "message": "Code is required and must be a non-empty string"
        })
    );
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn non_object_body_is_a_validation_error() {
    for raw in ["not json", "[1, 2, 3]", ""] {
        let app = dev_app(vec![(MockProvider::replying("gemini", "unused"), 1)]);
        let (status, body) = send(app, post("/analyze", raw)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {raw:?}");
        assert_eq!(body["error"], "Validation Error");
        assert_eq!(body["message"], "Request body must be a valid JSON object");
    }
}

#[tokio::test]
async fn oversized_code_is_rejected() {
    let options = ServiceOptions {
        limits: RequestLimits {
            max_code_chars: 16,
            ..Default::default()
        },
        ..Default::default()
    };
    let app = app(vec![(MockProvider::replying("gemini", "unused"), 1)], options);

    let (status, body) = send(
        app,
        post("/analyze", json!({"code": "x".repeat(17)}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("maximum length of 16")
    );
}

#[tokio::test]
async fn exhaustion_reports_detail_in_development() {
    let app = dev_app(vec![
        (MockProvider::failing("gemini", || upstream("gemini is down")), 1),
        (MockProvider::failing("openai", || upstream("openai is down")), 2),
    ]);

    let (status, body) = send(app, post("/analyze", r#"{"code": "x"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Analysis Failed");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("openai is down"), "message: {message}");
}

#[tokio::test]
async fn exhaustion_hides_detail_in_production() {
    let options = ServiceOptions {
        environment: Environment::Production,
        ..Default::default()
    };
    let app = app(
        vec![(MockProvider::failing("gemini", || upstream("secret detail")), 1)],
        options,
    );

    let (status, body) = send(app, post("/analyze", r#"{"code": "x"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Analysis Failed",
            "message": GENERIC_FAILURE_MESSAGE
        })
    );
}

#[tokio::test]
async fn production_still_shows_validation_messages() {
    let options = ServiceOptions {
        environment: Environment::Production,
        ..Default::default()
    };
    let app = app(vec![(MockProvider::replying("gemini", "unused"), 1)], options);

    let (status, body) = send(app, post("/explain", r#"{"language": "python"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Code is required and must be a non-empty string"
    );
}

// ============================================================================
// Body size and time budget
// ============================================================================

#[tokio::test]
async fn escaped_code_at_the_character_limit_is_accepted() {
    // Every character serializes as a six-byte `\u0001` escape.
    let code = "\u{1}".repeat(50_000);
    let raw = json!({ "code": code }).to_string();
    assert!(raw.len() > 6 * 50_000);

    let app = dev_app(vec![(MockProvider::replying("gemini", "fine"), 1)]);
    let (status, body) = send(app, post("/analyze", raw)).await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["data"]["provider"], "gemini");
}

#[tokio::test]
async fn report_with_maximum_results_is_accepted() {
    let results: Vec<Value> = (0..50)
        .map(|_| json!({ "analysis": "a".repeat(8_000) }))
        .collect();
    let raw = json!({ "analysisResults": results }).to_string();

    let app = dev_app(vec![(MockProvider::replying("gemini", "# Report"), 1)]);
    let (status, body) = send(app, post("/report", raw)).await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["data"]["analysis"], "# Report");
}

#[test]
fn derived_body_limit_admits_escaped_code_and_full_reports() {
    let limit = derived_body_limit(&RequestLimits::default());
    assert!(limit >= 6 * 52_000);
    assert!(limit >= 50 * 64 * 1024);
}

#[tokio::test]
async fn oversized_body_is_rejected_with_envelope() {
    let options = ServiceOptions {
        max_body_bytes: Some(1024),
        ..Default::default()
    };
    let provider = Arc::new(MockProvider::replying("gemini", "unused"));
    let gateway = Mimir::builder()
        .provider(provider.clone(), 1)
        .retry(RetryConfig::disabled())
        .build()
        .unwrap();
    let app = router(Arc::new(gateway), options);

    let raw = json!({ "code": "x".repeat(2048) }).to_string();
    let (status, body) = send(app, post("/analyze", raw)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Validation Error",
            "message": "Request body exceeds maximum size of 1024 bytes"
        })
    );
    assert_eq!(provider.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn request_budget_expiry_is_rendered_as_failure_envelope() {
    let options = ServiceOptions {
        request_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let app = app(vec![(MockProvider::hanging("gemini"), 1)], options);

    let (status, body) = send(app, post("/explain", r#"{"code": "x"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Analysis Failed",
            "message": "request timed out"
        })
    );
}

#[tokio::test(start_paused = true)]
async fn request_budget_expiry_is_masked_in_production() {
    let options = ServiceOptions {
        environment: Environment::Production,
        request_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let app = app(vec![(MockProvider::hanging("gemini"), 1)], options);

    let (status, body) = send(app, post("/analyze", r#"{"code": "x"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], GENERIC_FAILURE_MESSAGE);
}

// ============================================================================
// /explain, /improve, /report
// ============================================================================

#[tokio::test]
async fn explain_tags_metadata_with_operation() {
    let app = dev_app(vec![(MockProvider::replying("openai", "It adds numbers."), 1)]);

    let (status, body) = send(
        app,
        post("/explain", json!({"code": "a + b", "language": "py"}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["analysis"], "It adds numbers.");
    assert_eq!(body["data"]["metadata"]["language"], "python");
    assert_eq!(body["data"]["metadata"]["analysisType"], "explanation");
}

#[tokio::test]
async fn improve_accepts_optional_context() {
    let app = dev_app(vec![(MockProvider::replying("gemini", "use const"), 1)]);

    let (status, body) = send(
        app,
        post(
            "/improve",
            json!({"code": "var x = 1;", "context": "legacy browser support"}).to_string(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["metadata"]["analysisType"], "improvements");
}

#[tokio::test]
async fn report_skips_providers_without_report_support() {
    let app = dev_app(vec![
        (MockProvider::replying("anthropic", "unused").without_report(), 1),
        (MockProvider::replying("gemini", "# Report"), 2),
    ]);

    let (status, body) = send(
        app,
        post(
            "/report",
            json!({"analysisResults": [{"summary": "ok"}], "projectInfo": {"name": "demo"}})
                .to_string(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["provider"], "gemini");
    assert_eq!(body["data"]["metadata"]["language"], "multiple");
    assert_eq!(body["data"]["metadata"]["analysisType"], "report");
}

#[tokio::test]
async fn report_requires_results() {
    let app = dev_app(vec![(MockProvider::replying("gemini", "unused"), 1)]);

    let (status, body) = send(app, post("/report", r#"{"analysisResults": []}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Analysis results are required and must be a non-empty array"
    );
}

// ============================================================================
// /providers, /health
// ============================================================================

#[tokio::test]
async fn providers_lists_registrations_and_availability() {
    let app = dev_app(vec![
        (MockProvider::replying("gemini", "x"), 1),
        (MockProvider::replying("openai", "x").unavailable(), 2),
        (MockProvider::replying("anthropic", "x"), 3),
    ]);

    let (status, body) = send(app, get("/providers")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "available_providers": ["gemini", "anthropic"],
            "provider_configs": {"anthropic": true, "gemini": true, "openai": false}
        })
    );
}

#[tokio::test]
async fn health_reports_version() {
    let app = dev_app(vec![(MockProvider::replying("gemini", "x"), 1)]);

    let (status, body) = send(app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = dev_app(vec![(MockProvider::replying("gemini", "x"), 1)]);
    let response = app.oneshot(get("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
