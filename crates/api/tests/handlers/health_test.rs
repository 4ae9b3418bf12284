use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::test_utils::TestContext;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_version_reports_package() {
    let ctx = TestContext::new();

    let body: Value = ctx.server.get("/version").await.json();

    assert_eq!(body["name"], json!("waqitly-api"));
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_uses_error_envelope() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/api/spaces").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Route not found"));
}
