/// Metrics and telemetry for the Country Explorer API
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - HTTP request counts and latencies
/// - Upstream country lookups by outcome
/// - Media host uploads and deletions
/// - Errors by kind

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};
use std::time::Instant;

lazy_static! {
    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request latencies in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    /// Country API lookups by outcome (found, not_found, unavailable)
    pub static ref COUNTRY_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "country_lookups_total",
        "Total number of upstream country lookups",
        &["outcome"]
    )
    .unwrap();

    /// Media host operations by operation and outcome
    pub static ref MEDIA_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "media_operations_total",
        "Total number of media host operations",
        &["operation", "outcome"]
    )
    .unwrap();

    /// Errors by error kind
    pub static ref ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "errors_total",
        "Total number of errors returned to clients",
        &["kind"]
    )
    .unwrap();
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration);
}

/// Record an upstream country lookup
pub fn record_country_lookup(outcome: &str) {
    COUNTRY_LOOKUPS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record a media host operation
pub fn record_media_operation(operation: &str, success: bool) {
    MEDIA_OPERATIONS_TOTAL
        .with_label_values(&[operation, if success { "success" } else { "failure" }])
        .inc();
}

/// Record an error
pub fn record_error(kind: &str) {
    ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

/// Middleware recording every request against its matched route
///
/// Unmatched requests are grouped under a single label to keep cardinality bounded.
pub async fn track_http_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/favorites", 200, 0.05);
        let metrics = render_metrics();
        assert!(metrics.contains("http_requests_total"));
        assert!(metrics.contains("http_request_duration_seconds"));
    }

    #[test]
    fn test_record_country_lookup() {
        record_country_lookup("found");
        record_country_lookup("not_found");
        let metrics = render_metrics();
        assert!(metrics.contains("country_lookups_total"));
        assert!(metrics.contains("outcome=\"not_found\""));
    }

    #[test]
    fn test_record_media_operation() {
        record_media_operation("destroy", false);
        let metrics = render_metrics();
        assert!(metrics.contains("media_operations_total"));
        assert!(metrics.contains("outcome=\"failure\""));
    }

    #[test]
    fn test_record_error() {
        record_error("conflict");
        let metrics = render_metrics();
        assert!(metrics.contains("errors_total"));
    }
}
