//! HTTP routes for Modelgate
//!
//! This module defines all HTTP endpoints exposed by the relay.

pub mod chat;
pub mod health;
pub mod metrics;
pub mod models;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{docs::ApiDoc, AppState};

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Relay routes carry no compression layer: an encoder buffers output and
    // would hold back streamed chunks.
    let relay_routes = Router::new()
        .route("/v1/chat/completions", post(chat::chat_completions))
        .route("/chat/completions", post(chat::chat_completions));

    let management_routes = Router::new()
        .route(
            "/v1/models",
            get(models::list_models).post(models::create_model),
        )
        .route("/docs/openapi.json", get(openapi_json))
        .layer(CompressionLayer::new());

    // Public routes (health checks, metrics)
    let public_routes = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::prometheus_metrics));

    // Relayed responses carry the upstream's own headers, so CORS stays off
    // the relay routes.
    let api_routes = Router::new()
        .merge(public_routes)
        .merge(management_routes)
        .layer(cors);

    Router::new()
        .merge(api_routes)
        .merge(relay_routes)
        // Global middleware (applied to all routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handler for the OpenAPI JSON document
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
