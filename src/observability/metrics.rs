//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): relay calls by outcome, inner status
//! - `relay_request_duration_seconds` (histogram): end-to-end call latency
//! - `relay_fetch_failures_total` (counter): failed upstream attempts by kind

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::upstream::FetchErrorKind;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished relay call.
pub fn record_relay(outcome: &'static str, status: u16, start: Instant) {
    counter!("relay_requests_total", "outcome" => outcome, "status" => status.to_string()).increment(1);
    histogram!("relay_request_duration_seconds", "outcome" => outcome).record(start.elapsed().as_secs_f64());
}

/// Record one failed upstream attempt.
pub fn record_fetch_failure(kind: FetchErrorKind) {
    counter!("relay_fetch_failures_total", "kind" => kind.as_str()).increment(1);
}
