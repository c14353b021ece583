//! Prometheus metrics for monitoring ledger server health.
//!
//! Metrics are exposed in Prometheus text format on a dedicated listener
//! when `METRICS_BIND` is configured. Without an installed recorder every
//! call below is a no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use st_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("GET", "/fund", 200);
//! metrics::ledger_operations_total("fund", "ok");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Sets up a Prometheus scrape endpoint on the specified address.
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// Increments the total HTTP request counter with method, path, and status labels.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Ledger Metrics
// ============================================================================

/// Record a ledger operation and how it ended (`ok` or an error kind).
pub fn ledger_operations_total(operation: &str, outcome: &str) {
    metrics::counter!("ledger_operations_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}
