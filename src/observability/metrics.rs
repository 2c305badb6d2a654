//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): inbound requests by decision kind
//! - `relay_upstream_exchanges_total` (counter): origin exchanges by outcome
//! - `relay_upstream_duration_seconds` (histogram): origin exchange latency
//! - `relay_hits_total` (counter): statistics hits by kind and key
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter serves its own HTTP listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record how one inbound request was answered.
pub fn record_request(kind: &'static str, status: u16) {
    counter!("relay_requests_total", "kind" => kind, "status" => status.to_string()).increment(1);
}

/// Record one origin exchange.
pub fn record_exchange(outcome: &'static str, start_time: Instant) {
    counter!("relay_upstream_exchanges_total", "outcome" => outcome).increment(1);
    histogram!("relay_upstream_duration_seconds").record(start_time.elapsed().as_secs_f64());
}

/// Record one statistics hit.
pub fn record_hit(kind: &'static str, key: &str) {
    counter!("relay_hits_total", "kind" => kind, "key" => key.to_string()).increment(1);
}
