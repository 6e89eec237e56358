//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    // Force initialization of the lazy static
    let _ = &*PROMETHEUS_HANDLE;

    register_metrics();
}

fn register_metrics() {
    metrics::describe_counter!(
        "modelgate_requests_total",
        "Relay requests by response status and model"
    );
    metrics::describe_histogram!(
        "modelgate_request_duration_seconds",
        "Time until the relay response status was known"
    );
    metrics::describe_counter!(
        "modelgate_stream_outcomes_total",
        "Relayed bodies by how they ended"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a relay request
pub fn record_request(status: &str, model: &str, duration_secs: f64) {
    metrics::counter!("modelgate_requests_total", "status" => status.to_string(), "model" => model.to_string())
        .increment(1);
    metrics::histogram!("modelgate_request_duration_seconds", "model" => model.to_string())
        .record(duration_secs);
}

/// Record how a relayed body ended
pub fn record_stream_outcome(outcome: &str) {
    metrics::counter!("modelgate_stream_outcomes_total", "outcome" => outcome.to_string())
        .increment(1);
}
