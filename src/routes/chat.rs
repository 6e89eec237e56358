//! Chat completions relay endpoint
//!
//! Reads the body once, routes on its `model` field, and streams the
//! upstream response back unchanged.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::Response,
};
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    proxy::{
        extract_model_id, BuildError, InspectError, RequestContext, RouteRequest, UpstreamRequest,
    },
    routes::metrics::record_request,
    AppState,
};

/// Relay a chat completion request to the endpoint registered for its model
///
/// Failures up to and including the upstream call become a single error
/// response. Once the upstream status is relayed, later failures can only
/// cut the body short.
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> AppResult<Response<Body>> {
    let mut ctx = RequestContext::new(request.method().as_str(), request.uri().path());

    let result = relay(&state, request, &mut ctx).await;
    if let Err(err) = &result {
        ctx.log_error(&err.to_string());
        record_request(
            err.status_and_code().0.as_str(),
            ctx.model_label(),
            ctx.start_time.elapsed().as_secs_f64(),
        );
    }
    result
}

async fn relay(
    state: &AppState,
    request: Request,
    ctx: &mut RequestContext,
) -> AppResult<Response<Body>> {
    let (parts, body) = request.into_parts();

    let body = to_bytes(body, state.config.max_body_bytes)
        .await
        .map_err(|_| AppError::BadRequest("failed to read request body".to_string()))?;

    let model_id = extract_model_id(&body).map_err(inspect_error)?;

    // Only registered ids become metric labels; caller strings stay in logs.
    let (model, credential) = state.registry.resolve(&model_id).await.map_err(|e| {
        debug!(trace_id = %ctx.trace_id, model = %model_id, "Model lookup failed");
        e
    })?;
    ctx.model = Some(model.id.clone());
    ctx.log_request_start(body.len());

    let route = RouteRequest::from_parts(&parts, body);
    let upstream = UpstreamRequest::build(&route, &model, &credential).map_err(build_error)?;

    state.relay.forward(upstream, ctx.clone()).await
}

fn inspect_error(err: InspectError) -> AppError {
    match err {
        InspectError::NoModelField => {
            AppError::BadRequest("missing model in request body".to_string())
        }
        InspectError::MalformedBody(_) => {
            AppError::BadRequest("request body must be a JSON object".to_string())
        }
    }
}

fn build_error(err: BuildError) -> AppError {
    match err {
        BuildError::InvalidEndpoint => AppError::UpstreamError("invalid endpoint".to_string()),
        BuildError::InvalidCredential(_) => {
            AppError::UpstreamError("failed to create upstream request".to_string())
        }
    }
}
