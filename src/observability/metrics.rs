//! Metrics collection and exposition.
//!
//! # Metrics
//! - `frontdoor_requests_total` (counter): requests by method, status
//! - `frontdoor_request_duration_seconds` (histogram): latency distribution
//! - `frontdoor_origin_decisions_total` (counter): origin gate outcomes
//! - `frontdoor_stub_responses_total` (counter): degraded stub hits by service

use axum::{extract::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("frontdoor_requests_total", &labels).increment(1);
    metrics::histogram!("frontdoor_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_origin_decision(decision: &'static str) {
    metrics::counter!("frontdoor_origin_decisions_total", "decision" => decision).increment(1);
}

pub fn record_stub_response(service: &'static str) {
    metrics::counter!("frontdoor_stub_responses_total", "service" => service).increment(1);
}

/// Middleware recording request count and latency.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let response = next.run(req).await;
    record_request(&method, response.status().as_u16(), start);
    response
}
