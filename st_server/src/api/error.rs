//! Error responses for the ledger API.
//!
//! Every failure is answered with `{"error": "<message>"}` and a status code
//! derived from the ledger error kind:
//!
//! | Kind | Status |
//! |---|---|
//! | `InvalidInput`, `Conflict` | `400 Bad Request` |
//! | `NotFound` | `404 Not Found` |
//! | `Unavailable` | `500 Internal Server Error` |

use axum::{Json, http::StatusCode};
use serde::Serialize;
use social_tournament::{ErrorKind, LedgerError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Rejection returned by every ledger handler
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "not found".to_string(),
        }),
    )
}

/// HTTP status for a ledger error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Metric/log label for a ledger error kind
pub fn outcome_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidInput => "invalid_input",
        ErrorKind::NotFound => "not_found",
        ErrorKind::Conflict => "conflict",
        ErrorKind::Unavailable => "unavailable",
    }
}

/// Convert a ledger error into a response, hiding store internals
pub fn ledger_error(err: LedgerError) -> ApiError {
    let kind = err.kind();
    if kind == ErrorKind::Unavailable {
        tracing::error!(error = %err, "Ledger store failure");
    }
    (
        status_for(kind),
        Json(ErrorResponse {
            error: err.client_message(),
        }),
    )
}
