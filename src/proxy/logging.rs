//! Request logging utilities for relayed calls
//!
//! Provides structured logging with correlation IDs for tracing a request
//! from the inbound handler through the upstream call and the streamed body.
//! Credentials are never recorded here.

use std::time::Instant;
use tracing::{debug, error, info, warn, Span};
use uuid::Uuid;

use crate::streaming::{StreamOutcome, StreamSummary};

/// Context for tracking a request through the system
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    /// When the request started
    pub start_time: Instant,
    /// Inbound HTTP method
    pub method: String,
    /// Inbound path
    pub path: String,
    /// Model id extracted from the body, once known
    pub model: Option<String>,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(), // Short ID for readability
            start_time: Instant::now(),
            method: method.to_string(),
            path: path.to_string(),
            model: None,
        }
    }

    /// Model label for metrics
    pub fn model_label(&self) -> &str {
        self.model.as_deref().unwrap_or("unknown")
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    /// Log request initiation
    pub fn log_request_start(&self, body_size: usize) {
        info!(
            trace_id = %self.trace_id,
            method = %self.method,
            path = %self.path,
            model = ?self.model,
            body_size = %body_size,
            "Relay request started"
        );
    }

    /// Log request being sent to upstream
    pub fn log_upstream_request(&self, url: &str, header_count: usize) {
        debug!(
            trace_id = %self.trace_id,
            model = ?self.model,
            url = %url,
            header_count = %header_count,
            elapsed_ms = %self.elapsed_ms(),
            "Sending request to upstream"
        );
    }

    /// Log response received from upstream
    pub fn log_upstream_response(&self, status: u16, content_length: Option<u64>) {
        info!(
            trace_id = %self.trace_id,
            model = ?self.model,
            status = %status,
            content_length = ?content_length,
            elapsed_ms = %self.elapsed_ms(),
            "Response received from upstream"
        );
    }

    /// Log the end of the relayed body.
    ///
    /// A clean end of stream and a broken one look the same to the caller,
    /// so this is where the two are told apart.
    pub fn log_stream_ended(&self, summary: &StreamSummary) {
        match summary.outcome {
            StreamOutcome::Completed => info!(
                trace_id = %self.trace_id,
                model = ?self.model,
                outcome = %summary.outcome.as_str(),
                chunks = %summary.chunks,
                bytes = %summary.bytes,
                elapsed_ms = %self.elapsed_ms(),
                "Streaming response ended"
            ),
            StreamOutcome::UpstreamError | StreamOutcome::ClientDisconnected => warn!(
                trace_id = %self.trace_id,
                model = ?self.model,
                outcome = %summary.outcome.as_str(),
                chunks = %summary.chunks,
                bytes = %summary.bytes,
                elapsed_ms = %self.elapsed_ms(),
                "Streaming response terminated early"
            ),
        }
    }

    /// Log an upstream body read failure after headers were committed
    pub fn log_stream_error(&self, error: &str) {
        warn!(
            trace_id = %self.trace_id,
            model = ?self.model,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Upstream body read failed mid-stream"
        );
    }

    /// Log request failure
    pub fn log_error(&self, error: &str) {
        error!(
            trace_id = %self.trace_id,
            method = %self.method,
            path = %self.path,
            model = ?self.model,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Relay request failed"
        );
    }

    /// Log connection error (specific for debugging connectivity issues)
    pub fn log_connection_error(&self, error: &str, url: &str) {
        error!(
            trace_id = %self.trace_id,
            model = ?self.model,
            url = %url,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Connection to upstream failed"
        );
    }

    /// Create a tracing span for this request
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "relay_request",
            trace_id = %self.trace_id,
            method = %self.method,
            path = %self.path,
            model = ?self.model,
        )
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new("unknown", "unknown")
    }
}
