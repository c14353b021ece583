//! Wallet manager: funding, debiting and balance lookups.

use super::models::Account;
use crate::errors::{LedgerError, LedgerResult};
use crate::store::LedgerStore;

/// Wallet manager
#[derive(Clone)]
pub struct WalletManager<S> {
    store: S,
}

impl<S: LedgerStore> WalletManager<S> {
    /// Create a new wallet manager over a ledger store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add points to a player, creating the account on first funding
    ///
    /// # Returns
    ///
    /// * `LedgerResult<i64>` - Balance after funding
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidInput` - `points` is not positive
    pub async fn fund(&self, player_id: &str, points: i64) -> LedgerResult<i64> {
        ensure_positive("points", points)?;

        let balance = self.store.fund(player_id, points).await?;
        log::debug!("Funded {player_id} with {points}, balance {balance}");
        Ok(balance)
    }

    /// Take points from a player if the balance covers them
    ///
    /// The balance check and the decrement are one conditional update, so
    /// concurrent takes on one account can never drive it negative.
    ///
    /// # Returns
    ///
    /// * `LedgerResult<u64>` - Accounts modified: 1 on success, 0 when the
    ///   player is unknown or the balance is too low (not distinguished)
    pub async fn take(&self, player_id: &str, points: i64) -> LedgerResult<u64> {
        ensure_positive("points", points)?;

        let rows = self.store.debit(player_id, points).await?;
        if rows == 0 {
            log::debug!("Take of {points} from {player_id} matched no account");
        }
        Ok(rows)
    }

    /// Current balance of a player
    ///
    /// # Errors
    ///
    /// * `LedgerError::NotFound` - Player was never funded
    pub async fn balance(&self, player_id: &str) -> LedgerResult<Account> {
        self.store
            .account(player_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("player {player_id}")))
    }

    /// Clear every account, tournament and entry
    pub async fn reset(&self) -> LedgerResult<()> {
        log::info!("Resetting ledger");
        self.store.reset().await
    }
}

pub(crate) fn ensure_positive(name: &str, value: i64) -> LedgerResult<()> {
    if value <= 0 {
        return Err(LedgerError::InvalidInput(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLedgerStore;

    fn wallet() -> WalletManager<MemoryLedgerStore> {
        WalletManager::new(MemoryLedgerStore::new())
    }

    #[tokio::test]
    async fn test_fund_creates_then_increments() {
        let wallet = wallet();
        assert_eq!(wallet.fund("P1", 300).await.unwrap(), 300);
        assert_eq!(wallet.fund("P1", 200).await.unwrap(), 500);
        assert_eq!(wallet.balance("P1").await.unwrap().balance, 500);
    }

    #[tokio::test]
    async fn test_non_positive_points_rejected() {
        let wallet = wallet();
        for points in [0, -5] {
            assert!(matches!(
                wallet.fund("P1", points).await,
                Err(LedgerError::InvalidInput(_))
            ));
            assert!(matches!(
                wallet.take("P1", points).await,
                Err(LedgerError::InvalidInput(_))
            ));
        }
        assert!(wallet.balance("P1").await.is_err());
    }

    #[tokio::test]
    async fn test_take_unknown_and_insufficient_look_alike() {
        let wallet = wallet();
        wallet.fund("P1", 100).await.unwrap();

        assert_eq!(wallet.take("ghost", 10).await.unwrap(), 0);
        assert_eq!(wallet.take("P1", 101).await.unwrap(), 0);
        assert_eq!(wallet.take("P1", 100).await.unwrap(), 1);
        assert_eq!(wallet.balance("P1").await.unwrap().balance, 0);
    }

    #[tokio::test]
    async fn test_balance_unknown_player() {
        let err = wallet().balance("nobody").await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }
}
