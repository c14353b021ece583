//! Structured logging configuration.
//!
//! The ledger library logs through the `log` facade; those records are
//! forwarded into the tracing subscriber installed here.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use st_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    // `init` also installs the `log` -> tracing bridge
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log the outcome of a ledger operation
///
/// Failures the caller caused (bad input, unknown ids, duplicates) are logged
/// at debug; store failures at error.
///
/// # Arguments
///
/// * `operation` - Operation name (`fund`, `joinTournament`, ...)
/// * `outcome` - `ok` or the error kind
/// * `duration_ms` - Duration in milliseconds
pub fn log_ledger_operation(operation: &str, outcome: &str, duration_ms: u64) {
    if outcome == "unavailable" {
        tracing::error!(
            operation = operation,
            outcome = outcome,
            duration_ms = duration_ms,
            "Ledger operation failed"
        );
    } else {
        tracing::debug!(
            operation = operation,
            outcome = outcome,
            duration_ms = duration_ms,
            "Ledger operation completed"
        );
    }

    if duration_ms > 1000 {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            "PERFORMANCE: Slow ledger operation"
        );
    }
}
