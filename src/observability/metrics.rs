//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rhythms_requests_total` (counter): requests by method, route, status
//! - `rhythms_request_duration_seconds` (histogram): handler latency
//! - `rhythms_upstream_requests_total` (counter): upstream calls by service, outcome
//! - `rhythms_upstream_duration_seconds` (histogram): upstream latency by service
//! - `rhythms_rate_limited_total` (counter): rejected requests by limiter
//! - `rhythms_concerts_returned` (histogram): concerts per listing response

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install Prometheus exporter"),
    }
}

/// Record a finished HTTP request.
pub fn record_request(method: &str, route: &str, status: u16, started: Instant) {
    counter!(
        "rhythms_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "rhythms_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(started.elapsed().as_secs_f64());
}

/// Record a finished upstream call.
pub fn record_upstream(service: &'static str, outcome: &'static str, started: Instant) {
    counter!("rhythms_upstream_requests_total", "service" => service, "outcome" => outcome).increment(1);
    histogram!("rhythms_upstream_duration_seconds", "service" => service)
        .record(started.elapsed().as_secs_f64());
}

/// Record a request rejected by a rate limiter.
pub fn record_rate_limited(limiter: &'static str) {
    counter!("rhythms_rate_limited_total", "limiter" => limiter).increment(1);
}

/// Record how many concerts a listing returned.
pub fn record_concerts_returned(count: usize) {
    histogram!("rhythms_concerts_returned").record(count as f64);
}
