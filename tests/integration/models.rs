//! Model management endpoint integration tests
//!
//! - POST /v1/models - register or replace a model
//! - GET /v1/models - list registered models

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::TestApp;

#[tokio::test]
async fn test_create_model_returns_record_without_credential() {
    let server = TestApp::new().server();

    let response = server
        .post("/v1/models")
        .json(&json!({
            "id": "gpt-x",
            "name": "GPT X",
            "description": "test model",
            "endpoint": "https://up.example/api",
            "api_key": "sk-never-shown"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert!(!response.text().contains("sk-never-shown"));

    let body: Value = response.json();
    assert_eq!(
        body,
        json!({
            "data": {
                "id": "gpt-x",
                "name": "GPT X",
                "description": "test model",
                "endpoint": "https://up.example/api"
            }
        })
    );
}

#[tokio::test]
async fn test_list_models_ordered_by_id() {
    let app = TestApp::new();
    app.seed_model("zeta", "https://z.example", "kz").await;
    app.seed_model("alpha", "https://a.example", "ka").await;
    let server = app.server();

    let response = server.get("/v1/models").await;

    response.assert_status_ok();
    let body: Value = response.json();
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["alpha", "zeta"]);
    assert!(!response.text().contains("api_key"));
}

#[tokio::test]
async fn test_create_replaces_existing_model() {
    let server = TestApp::new().server();

    for endpoint in ["https://old.example", "https://new.example"] {
        server
            .post("/v1/models")
            .json(&json!({"id": "m", "name": "M", "endpoint": endpoint}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let body: Value = server.get("/v1/models").await.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["endpoint"], "https://new.example");
}

#[tokio::test]
async fn test_create_model_missing_fields() {
    let server = TestApp::new().server();

    let response = server
        .post("/v1/models")
        .json(&json!({"name": "No id"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "id, endpoint required");
}

#[tokio::test]
async fn test_create_model_invalid_json() {
    let server = TestApp::new().server();

    let response = server
        .post("/v1/models")
        .bytes("{\"id\":".into())
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "INVALID_JSON");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let server = TestApp::new().server();

    let response = server.get("/docs/openapi.json").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["paths"]["/v1/models"]["post"].is_object());
}
