//! Health endpoint integration tests

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::TestApp;

#[tokio::test]
async fn test_healthz_returns_plain_ok() {
    let server = TestApp::new().server();

    let response = server.get("/healthz").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn test_health_reports_registry_backend() {
    let server = TestApp::new().server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["registry"]["backend"], "memory");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_probes() {
    let server = TestApp::new().server();

    let ready = server.get("/health/ready").await;
    assert_eq!(ready.status_code(), StatusCode::OK);
    assert_eq!(ready.json::<Value>()["status"], "healthy");

    let live = server.get("/health/live").await;
    assert_eq!(live.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_relay_only_accepts_post() {
    let server = TestApp::new().server();

    let response = server.get("/v1/chat/completions").await;

    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
}
