//! Ledger API handlers.
//!
//! Query-string endpoints for funding, tournaments and balances, plus the
//! JSON settlement endpoint. Every success answers `{}` except `/balance`.
//!
//! # Examples
//!
//! ```bash
//! curl 'http://localhost:8080/fund?playerId=P1&points=300'
//! curl 'http://localhost:8080/announceTournament?tournamentId=1&deposit=1000'
//! curl 'http://localhost:8080/joinTournament?tournamentId=1&playerId=P1&backerId=P2&backerId=P3'
//! curl -X POST http://localhost:8080/resultTournament \
//!   -d '{"tournamentId": "1", "winners": [{"playerId": "P1", "prize": 2000}]}'
//! curl 'http://localhost:8080/balance?playerId=P1'
//! ```

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use social_tournament::{LedgerResult, LedgerStore, tournament::Winner, wallet::Account};
use std::time::Instant;

use super::AppState;
use super::error::{ApiError, bad_request, ledger_error, not_found, outcome_label};
use crate::{logging, metrics};

/// Raw query pairs; keys may repeat (`backerId`)
pub type QueryPairs = Vec<(String, String)>;

/// Body of `POST /resultTournament`
#[derive(Debug, Deserialize)]
pub struct ResultRequest {
    #[serde(rename = "tournamentId", default)]
    pub tournament_id: String,
    #[serde(default)]
    pub winners: Vec<Winner>,
}

/// Lookup helpers over the query pairs
struct Params(QueryPairs);

impl Params {
    /// First non-empty value of `name`
    fn required(&self, name: &str) -> Result<&str, ApiError> {
        self.0
            .iter()
            .find(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value.as_str())
            .ok_or_else(|| bad_request(format!("{name} is required")))
    }

    /// Required integer greater than zero
    fn positive(&self, name: &str) -> Result<i64, ApiError> {
        let raw = self.required(name)?;
        let value: i64 = raw
            .parse()
            .map_err(|e| bad_request(format!("{name}: {e}")))?;
        if value <= 0 {
            return Err(bad_request(format!("invalid {name}")));
        }
        Ok(value)
    }

    /// Every value of a repeated key, in request order
    fn all(&self, name: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .collect()
    }
}

/// Count and log the outcome, then turn ledger errors into responses
fn finish<T>(operation: &str, started: Instant, result: LedgerResult<T>) -> Result<T, ApiError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) => outcome_label(err.kind()),
    };
    metrics::ledger_operations_total(operation, outcome);
    logging::log_ledger_operation(operation, outcome, started.elapsed().as_millis() as u64);
    result.map_err(ledger_error)
}

fn empty() -> Json<Value> {
    Json(json!({}))
}

/// `GET /fund?playerId=&points=`
///
/// Creates the account on first funding.
///
/// # Errors
///
/// - `400 Bad Request`: Missing `playerId`, missing or non-positive `points`
pub async fn fund<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Value>, ApiError> {
    let params = Params(pairs);
    let player_id = params.required("playerId")?;
    let points = params.positive("points")?;

    let started = Instant::now();
    finish("fund", started, state.wallet_manager.fund(player_id, points).await)?;
    Ok(empty())
}

/// `GET /take?playerId=&points=`
///
/// # Errors
///
/// - `400 Bad Request`: Missing `playerId`, missing or non-positive `points`
/// - `404 Not Found`: Unknown player or balance below `points`
pub async fn take<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Value>, ApiError> {
    let params = Params(pairs);
    let player_id = params.required("playerId")?;
    let points = params.positive("points")?;

    let started = Instant::now();
    let rows = finish("take", started, state.wallet_manager.take(player_id, points).await)?;
    if rows == 0 {
        return Err(not_found());
    }
    Ok(empty())
}

/// `GET /announceTournament?tournamentId=&deposit=`
///
/// # Errors
///
/// - `400 Bad Request`: Missing `tournamentId`, bad `deposit`, or id already announced
pub async fn announce_tournament<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Value>, ApiError> {
    let params = Params(pairs);
    let tournament_id = params.required("tournamentId")?;
    let deposit = params.positive("deposit")?;

    let started = Instant::now();
    finish(
        "announceTournament",
        started,
        state
            .tournament_manager
            .announce(tournament_id, deposit)
            .await,
    )?;
    Ok(empty())
}

/// `GET /joinTournament?tournamentId=&playerId=[&backerId=...]`
///
/// # Errors
///
/// - `400 Bad Request`: Missing ids, or the player already joined
/// - `404 Not Found`: Tournament unknown or finished, or a participant cannot
///   cover the stake
pub async fn join_tournament<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Value>, ApiError> {
    let params = Params(pairs);
    let tournament_id = params.required("tournamentId")?;
    let player_id = params.required("playerId")?;
    let backers = params.all("backerId");

    let started = Instant::now();
    finish(
        "joinTournament",
        started,
        state
            .tournament_manager
            .join(tournament_id, player_id, backers)
            .await,
    )?;
    Ok(empty())
}

/// `POST /resultTournament`
///
/// # Request Body
///
/// ```json
/// {"tournamentId": "1", "winners": [{"playerId": "P1", "prize": 2000}]}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed JSON, empty `tournamentId` or `winners`,
///   negative prize
/// - `404 Not Found`: Tournament unknown or already finished, winner without
///   an entry, or recipient without an account
pub async fn result_tournament<S: LedgerStore>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: ResultRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected resultTournament body");
        bad_request("bad request")
    })?;

    if request.winners.is_empty() {
        return Err(bad_request("bad request, empty winners"));
    }
    if request.tournament_id.is_empty() {
        return Err(bad_request("bad request, empty tournamentId"));
    }

    let started = Instant::now();
    finish(
        "resultTournament",
        started,
        state
            .tournament_manager
            .result(&request.tournament_id, &request.winners)
            .await,
    )?;
    Ok(empty())
}

/// `GET /balance?playerId=`
///
/// # Response
///
/// ```json
/// {"playerId": "P1", "balance": 550}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing `playerId`
/// - `404 Not Found`: Player was never funded
pub async fn balance<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Account>, ApiError> {
    let params = Params(pairs);
    let player_id = params.required("playerId")?;

    let started = Instant::now();
    let account = finish("balance", started, state.wallet_manager.balance(player_id).await)?;
    Ok(Json(account))
}

/// `GET /reset`
pub async fn reset<S: LedgerStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Value>, ApiError> {
    let started = Instant::now();
    finish("reset", started, state.wallet_manager.reset().await)?;
    Ok(empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn params(pairs: &[(&str, &str)]) -> Params {
        Params(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_required_rejects_missing_and_empty() {
        let p = params(&[("playerId", "")]);
        let (status, Json(body)) = p.required("playerId").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "playerId is required");

        assert_eq!(params(&[("playerId", "P1")]).required("playerId").unwrap(), "P1");
    }

    #[test]
    fn test_positive_rejects_bad_numbers() {
        assert!(params(&[("points", "abc")]).positive("points").is_err());
        assert!(params(&[("points", "0")]).positive("points").is_err());
        assert!(params(&[("points", "-3")]).positive("points").is_err());
        assert_eq!(params(&[("points", "300")]).positive("points").unwrap(), 300);
    }

    #[test]
    fn test_repeated_backers_keep_order_and_duplicates() {
        let p = params(&[
            ("tournamentId", "1"),
            ("backerId", "P3"),
            ("playerId", "P1"),
            ("backerId", "P2"),
            ("backerId", "P3"),
        ]);
        assert_eq!(p.all("backerId"), vec!["P3", "P2", "P3"]);
        assert!(p.all("nothing").is_empty());
    }

    #[test]
    fn test_result_request_shape() {
        let request: ResultRequest = serde_json::from_str(
            r#"{"tournamentId": "1", "winners": [{"playerId": "P1", "prize": 2000}]}"#,
        )
        .unwrap();
        assert_eq!(request.tournament_id, "1");
        assert_eq!(request.winners, vec![Winner::new("P1", 2000)]);

        let empty: ResultRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.tournament_id.is_empty() && empty.winners.is_empty());
    }
}
