//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_upstream_errors_total` (counter): transport failures by route
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels for method, route, status code

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed request.
pub fn record_request(method: &Method, status: StatusCode, route: &str, start: Instant) {
    let labels = [
        ("method", method.as_str().to_string()),
        ("status", status.as_u16().to_string()),
        ("route", route.to_string()),
    ];
    metrics::counter!("gateway_requests_total", &labels).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record a failed upstream call.
pub fn record_upstream_error(route: &str) {
    metrics::counter!("gateway_upstream_errors_total", "route" => route.to_string()).increment(1);
}
