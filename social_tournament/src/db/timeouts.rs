//! Transaction timeout helpers
//!
//! A ledger protocol runs inside a single store transaction. Wrapping its steps
//! in [`with_timeout`] bounds how long it may hold that transaction; on expiry
//! the future is dropped, which drops the open transaction and rolls it back.
//! The commit itself runs outside the deadline, so an operation reported as
//! timed out never took effect.

use crate::errors::{LedgerError, LedgerResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Default timeout for single-statement operations (5 seconds)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for join/settlement transactions (10 seconds)
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Run a ledger operation with a deadline
///
/// # Example
///
/// ```no_run
/// use social_tournament::db::timeouts::{with_timeout, DEFAULT_QUERY_TIMEOUT};
/// use social_tournament::wallet::WalletManager;
/// use social_tournament::store::MemoryLedgerStore;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let wallet = WalletManager::new(MemoryLedgerStore::new());
/// with_timeout(DEFAULT_QUERY_TIMEOUT, wallet.fund("P1", 300)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> LedgerResult<T>
where
    F: Future<Output = LedgerResult<T>>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(LedgerError::Timeout(duration)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_constants() {
        assert_eq!(DEFAULT_QUERY_TIMEOUT.as_secs(), 5);
        assert_eq!(DEFAULT_TRANSACTION_TIMEOUT.as_secs(), 10);
    }

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_timeout(Duration::from_secs(1), async { Ok::<_, LedgerError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let result: LedgerResult<()> = with_timeout(Duration::from_secs(1), async {
            Err(LedgerError::NotFound("P1".into()))
        })
        .await;
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_expired_deadline_reports_timeout() {
        let result: LedgerResult<()> = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        let err = result.unwrap_err();
        assert!(matches!(err, LedgerError::Timeout(_)));
        assert!(err.to_string().contains("timed out"));
    }
}
