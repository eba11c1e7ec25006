//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route, status
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_engine_calls_total` (counter): engine calls by operation, outcome
//! - `gateway_engine_call_duration_seconds` (histogram): engine latency by operation
//! - `gateway_auth_rejections_total` (counter): rejected API keys by reason
//! - `gateway_engine_ready` (gauge): 1=ready, 0=starting
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus metrics exporter listening");
    Ok(())
}

pub fn record_request(route: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_engine_call(operation: &'static str, outcome: &'static str, start: Instant) {
    counter!("gateway_engine_calls_total", "operation" => operation, "outcome" => outcome).increment(1);
    histogram!("gateway_engine_call_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_auth_rejection(reason: &'static str) {
    counter!("gateway_auth_rejections_total", "reason" => reason).increment(1);
}

pub fn record_engine_ready(ready: bool) {
    gauge!("gateway_engine_ready").set(if ready { 1.0 } else { 0.0 });
}
