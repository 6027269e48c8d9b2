//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): exchanges by method, status, outcome
//! - `proxy_request_duration_seconds` (histogram): latency by method, outcome
//!
//! Recording is a no-op until a recorder is installed, so the exporter is
//! only started when `observability.metrics_address` is set.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// How an exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Upstream answered; its status was relayed.
    Relayed,
    /// Local or transport failure; a 500 envelope was returned.
    Failed,
    /// OPTIONS answered locally.
    Preflight,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Relayed => "relayed",
            Outcome::Failed => "failed",
            Outcome::Preflight => "preflight",
        }
    }
}

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter"),
    }
}

/// Record one finished exchange.
pub fn record_exchange(method: &str, status: u16, outcome: Outcome, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    histogram!(
        "proxy_request_duration_seconds",
        "method" => method.to_string(),
        "outcome" => outcome.as_str()
    )
    .record(start.elapsed().as_secs_f64());
}
