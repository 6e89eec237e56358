//! Streaming relay to the resolved upstream endpoint

use std::time::Duration;

use axum::body::Body;
use axum::http::Response;
use futures::StreamExt;
use tracing::Instrument;

use super::headers::filter_hop_by_hop;
use super::logging::RequestContext;
use super::request::UpstreamRequest;
use crate::{
    config::Config,
    error::{AppError, AppResult},
    routes::metrics::{record_request, record_stream_outcome},
    streaming::relay_chunks,
};

/// Build the shared outbound HTTP client.
///
/// No total request timeout is set: streamed completions may run for as
/// long as the caller stays connected. Only connection setup is bounded.
pub fn build_http_client(config: &Config) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .build()
}

/// Performs the upstream call and pipes the response back to the caller
pub struct ModelRelay {
    client: reqwest::Client,
    chunk_size: usize,
}

impl ModelRelay {
    /// Create a relay on top of a shared client
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            chunk_size: config.relay_chunk_bytes,
        }
    }

    /// Send the upstream request and relay its response.
    pub async fn forward(
        &self,
        request: UpstreamRequest,
        ctx: RequestContext,
    ) -> AppResult<Response<Body>> {
        let span = ctx.create_span();
        let upstream = self.send(request, &ctx).instrument(span).await?;
        Ok(self.into_response(upstream, ctx))
    }

    /// Issue the outbound call.
    ///
    /// Any failure before response headers arrive is a bad gateway; nothing
    /// has been written to the caller at that point. Dropping the returned
    /// future (caller disconnected) cancels the call.
    pub async fn send(
        &self,
        request: UpstreamRequest,
        ctx: &RequestContext,
    ) -> AppResult<reqwest::Response> {
        ctx.log_upstream_request(&request.url, request.headers.len());

        let url = request.url;
        self.client
            .request(request.method, &url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| {
                ctx.log_connection_error(&e.to_string(), &url);
                AppError::UpstreamError("upstream request failed".to_string())
            })
    }

    /// Commit status and filtered headers, then stream the body in bounded
    /// chunks. Headers are written once, before any body byte.
    pub fn into_response(&self, upstream: reqwest::Response, ctx: RequestContext) -> Response<Body> {
        let status = upstream.status();
        ctx.log_upstream_response(status.as_u16(), upstream.content_length());
        record_request(
            status.as_str(),
            ctx.model_label(),
            ctx.start_time.elapsed().as_secs_f64(),
        );

        let headers = filter_hop_by_hop(upstream.headers());

        let body_ctx = ctx.clone();
        let chunks = relay_chunks(upstream.bytes_stream(), self.chunk_size, move |summary| {
            record_stream_outcome(summary.outcome.as_str());
            body_ctx.log_stream_ended(&summary);
        });

        let body = Body::from_stream(chunks.inspect(move |item| {
            if let Err(e) = item {
                ctx.log_stream_error(&e.to_string());
            }
        }));

        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}
