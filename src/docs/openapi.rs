//! OpenAPI specification for the management API

use utoipa::OpenApi;

use crate::{
    error::{ErrorBody, ErrorResponse},
    registry::{CreateModelInput, ModelRecord},
    routes::models::{ModelResponse, ModelsResponse},
};

/// OpenAPI specification for the Modelgate management API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Modelgate Management API",
        version = "1.0.0",
        description = "Register the models Modelgate routes chat completion requests to"
    ),
    paths(
        crate::routes::models::list_models,
        crate::routes::models::create_model
    ),
    components(
        schemas(
            ModelRecord,
            CreateModelInput,
            ModelsResponse,
            ModelResponse,
            ErrorResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "Models", description = "Model registry management")
    )
)]
pub struct ApiDoc;
