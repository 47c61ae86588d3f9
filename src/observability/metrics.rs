//! Metrics collection and exposition.
//!
//! # Metrics
//! - `config_updates_total` (counter): configuration changes by root, outcome
//! - `config_storage_writes_total` (counter): storage writes by root, outcome
//! - `config_http_requests_total` (counter): REST calls by method, status

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_update(root: &str, outcome: &'static str) {
    metrics::counter!("config_updates_total", "root" => root.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_storage_write(root: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("config_storage_writes_total", "root" => root.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_http(method: &str, status: u16) {
    metrics::counter!(
        "config_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
