//! Social tournament ledger server.
//!
//! Serves the ledger API over HTTP, backed by PostgreSQL.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use log::info;
use pico_args::Arguments;
use social_tournament::{PgLedgerStore, db::Database};
use st_server::{api, config::ServerConfig, logging, metrics};

const HELP: &str = "\
Run the social tournament points ledger server

USAGE:
  st_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 0.0.0.0:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --init-schema            Create ledger tables if missing  [env: INIT_SCHEMA]
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                      Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL                     PostgreSQL connection string
  DB_MAX_CONNECTIONS               Pool size upper bound
  DB_MIN_CONNECTIONS               Pool size lower bound
  LEDGER_TRANSACTION_TIMEOUT_SECS  Join/result transaction timeout
  METRICS_BIND                     Prometheus listener (disabled if unset)
  RUST_LOG                         Log filter (default: info,sqlx=warn)
  (A .env file in the working directory is loaded first)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs
        .opt_value_from_str("--bind")
        .context("Invalid --bind address")?;
    let database_url: Option<String> = pargs
        .opt_value_from_str("--db-url")
        .context("Invalid --db-url")?;
    let init_schema = pargs.contains("--init-schema");

    logging::init();

    let config = ServerConfig::from_env(bind, database_url, init_schema)?;
    config.validate()?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics listening on {metrics_bind}");
    }

    info!("Connecting to database");
    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected successfully");

    if config.init_schema {
        db.initialize_schema()
            .await
            .context("Failed to initialize schema")?;
        info!("Ledger schema initialized");
    }

    let store = PgLedgerStore::new(Arc::new(db.pool().clone()));
    let state = api::AppState::with_transaction_timeout(store, config.transaction_timeout);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
