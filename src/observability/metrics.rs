//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): forwarded requests by target, status
//! - `router_request_duration_seconds` (histogram): upstream latency by target
//! - `router_default_fallbacks_total` (counter): requests that matched no route
//! - `router_fanout_total` (counter): requests resolved to more than one target
//! - `router_extraction_errors_total` (counter): discriminator extraction failures
//!
//! # Design Decisions
//! - Without an installed recorder the macros are no-ops
//! - Prometheus exporter only runs when a metrics address is configured

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!("router_requests_total", "Requests forwarded upstream");
    describe_histogram!("router_request_duration_seconds", "Upstream request duration in seconds");
    describe_counter!("router_default_fallbacks_total", "Requests forwarded to the default target");
    describe_counter!("router_fanout_total", "Requests forwarded to more than one target");
    describe_counter!("router_extraction_errors_total", "Requests rejected while reading the discriminator");

    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one upstream forwarding.
pub fn record_forward(target: &str, status: u16, start: Instant) {
    counter!("router_requests_total", "target" => target.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!("router_request_duration_seconds", "target" => target.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_default_fallback() {
    counter!("router_default_fallbacks_total").increment(1);
}

pub fn record_fanout(targets: usize) {
    if targets > 1 {
        counter!("router_fanout_total").increment(1);
    }
}

pub fn record_extraction_error() {
    counter!("router_extraction_errors_total").increment(1);
}
