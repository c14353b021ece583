//! HTTP API for the social tournament ledger.
//!
//! # Modules
//!
//! - [`ledger`]: funding, tournaments, settlement, balances, reset
//! - [`error`]: `{"error": ..}` responses and status mapping
//! - [`middleware`]: request metrics
//! - [`request_id`]: request ID propagation and log correlation
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /fund?playerId=&points=
//! GET  /take?playerId=&points=
//! GET  /announceTournament?tournamentId=&deposit=
//! GET  /joinTournament?tournamentId=&playerId=[&backerId=...]
//! POST /resultTournament          {"tournamentId", "winners": [{"playerId", "prize"}]}
//! GET  /balance?playerId=
//! GET  /reset
//! GET  /health
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use social_tournament::MemoryLedgerStore;
//! use st_server::api::{AppState, create_router};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState::new(MemoryLedgerStore::new());
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod ledger;
pub mod middleware;
pub mod request_id;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use social_tournament::db::timeouts::{DEFAULT_QUERY_TIMEOUT, with_timeout};
use social_tournament::{LedgerStore, tournament::TournamentManager, wallet::WalletManager};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Both managers wrap clones of the same store.
#[derive(Clone)]
pub struct AppState<S> {
    pub wallet_manager: Arc<WalletManager<S>>,
    pub tournament_manager: Arc<TournamentManager<S>>,
}

impl<S: LedgerStore> AppState<S> {
    /// State with the default transaction timeout
    pub fn new(store: S) -> Self {
        Self {
            wallet_manager: Arc::new(WalletManager::new(store.clone())),
            tournament_manager: Arc::new(TournamentManager::new(store)),
        }
    }

    /// State whose joins and settlements give up after `timeout`
    pub fn with_transaction_timeout(store: S, timeout: Duration) -> Self {
        Self {
            wallet_manager: Arc::new(WalletManager::new(store.clone())),
            tournament_manager: Arc::new(
                TournamentManager::new(store).with_transaction_timeout(timeout),
            ),
        }
    }
}

/// Create the API router with all endpoints and middleware.
pub fn create_router<S: LedgerStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/fund", get(ledger::fund::<S>))
        .route("/take", get(ledger::take::<S>))
        .route("/announceTournament", get(ledger::announce_tournament::<S>))
        .route("/joinTournament", get(ledger::join_tournament::<S>))
        .route("/resultTournament", post(ledger::result_tournament::<S>))
        .route("/balance", get(ledger::balance::<S>))
        .route("/reset", get(ledger::reset::<S>))
        .route("/health", get(health_check::<S>))
        .route_layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(request_id::request_id_middleware)),
        )
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` with body `OK` when the store answers within the query
/// timeout, `503 Service Unavailable` otherwise.
async fn health_check<S: LedgerStore>(State(state): State<AppState<S>>) -> impl IntoResponse {
    match with_timeout(DEFAULT_QUERY_TIMEOUT, state.wallet_manager.store().ping()).await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(err) => {
            tracing::warn!(error = %err, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    }
}
