//! Ledger error types.

use std::time::Duration;
use thiserror::Error;

/// Coarse error taxonomy exposed to adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range arguments
    InvalidInput,
    /// Unknown player/tournament/entry, or a debit the balance cannot cover
    NotFound,
    /// Duplicate tournament or duplicate entry
    Conflict,
    /// Store unreachable, timed out, or failed unexpectedly
    Unavailable,
}

/// Ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Invalid argument (non-positive points, negative prize, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Record not found, or debit affected no rows
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint would be violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Transaction did not complete in time and was rolled back
    #[error("Transaction timed out after {0:?}")]
    Timeout(Duration),

    /// Credit would overflow the balance column
    #[error("Balance overflow")]
    BalanceOverflow,

    /// Any other database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl LedgerError {
    /// Fold the error into the adapter-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidInput(_) => ErrorKind::InvalidInput,
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::Conflict(_) => ErrorKind::Conflict,
            LedgerError::Unavailable(_)
            | LedgerError::Timeout(_)
            | LedgerError::BalanceOverflow
            | LedgerError::Database(_) => ErrorKind::Unavailable,
        }
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database and connectivity errors are collapsed into a generic message so
    /// SQL details never reach a client.
    pub fn client_message(&self) -> String {
        match self {
            LedgerError::Database(_) | LedgerError::Unavailable(_) => {
                "Internal server error".to_string()
            }
            LedgerError::NotFound(_) => "not found".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // Constraint names stay out of the message; it reaches clients
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                LedgerError::Conflict("already exists".to_string())
            }
            // numeric_value_out_of_range
            sqlx::Error::Database(db) if db.code().as_deref() == Some("22003") => {
                LedgerError::BalanceOverflow
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => LedgerError::Unavailable(err.to_string()),
            _ => LedgerError::Database(err),
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
