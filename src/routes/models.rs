//! Model management endpoints
//!
//! Register and list the models the relay can route to. Credentials are
//! accepted on create but never returned.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    registry::{CreateModelInput, ModelRecord},
    AppState,
};

/// Models list response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModelsResponse {
    pub data: Vec<ModelRecord>,
}

/// Single model response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModelResponse {
    pub data: ModelRecord,
}

/// List registered models
#[utoipa::path(
    get,
    path = "/v1/models",
    tag = "Models",
    responses(
        (status = 200, description = "Registered models ordered by id", body = ModelsResponse),
        (status = 503, description = "Registry unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_models(
    State(state): State<Arc<AppState>>,
) -> AppResult<(StatusCode, Json<ModelsResponse>)> {
    let models = state.registry.list().await.map_err(|e| {
        error!(error = %e, "Failed to list models");
        e
    })?;

    Ok((StatusCode::OK, Json(ModelsResponse { data: models })))
}

/// Register a model, replacing any model with the same id
#[utoipa::path(
    post,
    path = "/v1/models",
    tag = "Models",
    request_body = CreateModelInput,
    responses(
        (status = 201, description = "Model stored", body = ModelResponse),
        (status = 400, description = "Invalid JSON or missing fields", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_model(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<ModelResponse>)> {
    let input: CreateModelInput = serde_json::from_slice(&body)?;

    let model = state.registry.create(input).await.map_err(|e| {
        if !matches!(e, AppError::Validation(_)) {
            error!(error = %e, "Failed to create model");
        }
        e
    })?;

    info!(model = %model.id, endpoint = %model.endpoint, "Model registered");
    Ok((StatusCode::CREATED, Json(ModelResponse { data: model })))
}
