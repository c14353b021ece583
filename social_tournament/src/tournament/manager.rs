//! Tournament manager: announcing tournaments, joining with backers, and settling results.

use super::models::{Entry, Payout, Tournament, Winner, share_for};
use crate::db::timeouts::{DEFAULT_TRANSACTION_TIMEOUT, with_timeout};
use crate::errors::{LedgerError, LedgerResult};
use crate::store::{LedgerStore, LedgerTransaction};
use crate::wallet::PlayerId;
use crate::wallet::manager::ensure_positive;
use std::time::Duration;

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager<S> {
    store: S,
    transaction_timeout: Duration,
}

impl<S: LedgerStore> TournamentManager<S> {
    /// Create a new tournament manager over a ledger store
    pub fn new(store: S) -> Self {
        Self {
            store,
            transaction_timeout: DEFAULT_TRANSACTION_TIMEOUT,
        }
    }

    /// Bound how long a join or settlement may hold its transaction
    pub fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = timeout;
        self
    }

    /// Announce a tournament with an entry deposit
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidInput` - `deposit` is not positive
    /// * `LedgerError::Conflict` - A tournament with this id already exists
    pub async fn announce(&self, tournament_id: &str, deposit: i64) -> LedgerResult<Tournament> {
        ensure_positive("deposit", deposit)?;

        let tournament = Tournament::announced(tournament_id, deposit);
        if !self.store.insert_tournament(&tournament).await? {
            return Err(LedgerError::Conflict(format!(
                "tournament {tournament_id} already announced"
            )));
        }

        log::info!("Announced tournament {tournament_id} with deposit {deposit}");
        Ok(tournament)
    }

    /// Get a tournament in any state
    pub async fn get_tournament(&self, tournament_id: &str) -> LedgerResult<Tournament> {
        self.store
            .tournament(tournament_id)
            .await?
            .ok_or_else(|| tournament_not_found(tournament_id))
    }

    /// Entries of a tournament in join order
    pub async fn entries(&self, tournament_id: &str) -> LedgerResult<Vec<Entry>> {
        self.get_tournament(tournament_id).await?;
        self.store.entries(tournament_id).await
    }

    /// Enter `player_id` into an open tournament, backed by `backers`
    ///
    /// The deposit is split evenly (rounded down) between the player and every
    /// backer; each of them is debited that stake. Either the entry is recorded
    /// and every stake is taken, or nothing changes.
    ///
    /// Backers are taken as given: order is kept and duplicates, including the
    /// player backing themselves, are debited once per occurrence.
    ///
    /// # Errors
    ///
    /// * `LedgerError::NotFound` - Tournament unknown or finished, or a
    ///   participant is unknown or cannot cover the stake
    /// * `LedgerError::Conflict` - Player already entered this tournament
    /// * `LedgerError::Timeout` - Transaction exceeded the configured timeout
    pub async fn join(
        &self,
        tournament_id: &str,
        player_id: &str,
        backers: Vec<PlayerId>,
    ) -> LedgerResult<Entry> {
        // A commit already sent is not cut short by the deadline
        let (tx, entry, stake) = with_timeout(
            self.transaction_timeout,
            self.stage_join(tournament_id, player_id, backers),
        )
        .await?;
        tx.commit().await?;

        log::info!(
            "Player {player_id} joined tournament {tournament_id} with {} backer(s), stake {stake}",
            entry.backers.len()
        );
        Ok(entry)
    }

    /// Run every join step, leaving the transaction ready to commit
    async fn stage_join(
        &self,
        tournament_id: &str,
        player_id: &str,
        backers: Vec<PlayerId>,
    ) -> LedgerResult<(S::Transaction, Entry, i64)> {
        let mut tx = self.store.begin().await?;

        let tournament = match tx.open_tournament(tournament_id).await? {
            Some(tournament) => tournament,
            None => return abort(tx, tournament_not_found(tournament_id)).await,
        };

        let stake = tournament.stake(backers.len());
        let entry = Entry::new(tournament_id, player_id, backers);

        if !tx.insert_entry(&entry).await? {
            let err = LedgerError::Conflict(format!(
                "player {player_id} already joined tournament {tournament_id}"
            ));
            return abort(tx, err).await;
        }

        let payers: Vec<PlayerId> = entry.payers().cloned().collect();
        tx.lock_accounts(&payers).await?;

        for payer in &payers {
            if tx.debit(payer, stake).await? == 0 {
                let err = LedgerError::NotFound(format!("player {payer} cannot cover {stake}"));
                return abort(tx, err).await;
            }
        }

        Ok((tx, entry, stake))
    }

    /// Finish a tournament and pay every winner's entry
    ///
    /// Each prize is split evenly (rounded down) between the winning entry's
    /// backers and the player. All winners are paid in one transaction: if any
    /// of them fails, no one is paid and the tournament stays open.
    ///
    /// # Returns
    ///
    /// * `LedgerResult<Vec<Payout>>` - One payout per credit, in payment order
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidInput` - A prize is negative
    /// * `LedgerError::NotFound` - Tournament unknown or already finished, a
    ///   winner has no entry, or a recipient has no account
    /// * `LedgerError::Timeout` - Transaction exceeded the configured timeout
    pub async fn result(
        &self,
        tournament_id: &str,
        winners: &[Winner],
    ) -> LedgerResult<Vec<Payout>> {
        if let Some(winner) = winners.iter().find(|w| w.prize < 0) {
            return Err(LedgerError::InvalidInput(format!(
                "prize for {} must not be negative, got {}",
                winner.player_id, winner.prize
            )));
        }

        let (tx, payouts) = with_timeout(
            self.transaction_timeout,
            self.stage_result(tournament_id, winners),
        )
        .await?;
        tx.commit().await?;

        log::info!(
            "Settled tournament {tournament_id}: {} winner(s), {} payout(s)",
            winners.len(),
            payouts.len()
        );
        Ok(payouts)
    }

    /// Finish the tournament and credit every winner's recipients, leaving the
    /// transaction ready to commit
    async fn stage_result(
        &self,
        tournament_id: &str,
        winners: &[Winner],
    ) -> LedgerResult<(S::Transaction, Vec<Payout>)> {
        let mut tx = self.store.begin().await?;

        if tx.finish_tournament(tournament_id).await? == 0 {
            return abort(tx, tournament_not_found(tournament_id)).await;
        }

        let mut winning_entries = Vec::with_capacity(winners.len());
        for winner in winners {
            match tx.entry(tournament_id, &winner.player_id).await? {
                Some(entry) => winning_entries.push((winner, entry)),
                None => {
                    let err = LedgerError::NotFound(format!(
                        "player {} has no entry in tournament {tournament_id}",
                        winner.player_id
                    ));
                    return abort(tx, err).await;
                }
            }
        }

        let recipients: Vec<PlayerId> = winning_entries
            .iter()
            .flat_map(|(_, entry)| entry.recipients().cloned())
            .collect();
        tx.lock_accounts(&recipients).await?;

        let mut payouts = Vec::with_capacity(recipients.len());
        for (winner, entry) in &winning_entries {
            let share = share_for(winner.prize, entry.participant_count());
            for recipient in entry.recipients() {
                if tx.credit(recipient, share).await? == 0 {
                    let err = LedgerError::NotFound(format!("player {recipient}"));
                    return abort(tx, err).await;
                }
                payouts.push(Payout::new(recipient.clone(), share));
            }
        }

        Ok((tx, payouts))
    }
}

fn tournament_not_found(tournament_id: &str) -> LedgerError {
    LedgerError::NotFound(format!("tournament {tournament_id}"))
}

/// Roll back and surface `err`
async fn abort<T, R>(tx: T, err: LedgerError) -> LedgerResult<R>
where
    T: LedgerTransaction,
{
    log::warn!("Rolling back: {err}");
    if let Err(rollback_err) = tx.rollback().await {
        log::warn!("Rollback failed: {rollback_err}");
    }
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLedgerStore;
    use crate::store::memory::MemoryLedgerTransaction;
    use crate::wallet::{Account, WalletManager};
    use async_trait::async_trait;

    const SLOW_COMMIT: Duration = Duration::from_millis(100);

    /// Memory store whose commits outlast a short transaction timeout
    #[derive(Clone, Default)]
    struct SlowCommitStore {
        inner: MemoryLedgerStore,
    }

    struct SlowCommitTransaction(MemoryLedgerTransaction);

    #[async_trait]
    impl LedgerStore for SlowCommitStore {
        type Transaction = SlowCommitTransaction;

        async fn begin(&self) -> LedgerResult<SlowCommitTransaction> {
            Ok(SlowCommitTransaction(self.inner.begin().await?))
        }

        async fn fund(&self, player_id: &str, points: i64) -> LedgerResult<i64> {
            self.inner.fund(player_id, points).await
        }

        async fn debit(&self, player_id: &str, points: i64) -> LedgerResult<u64> {
            self.inner.debit(player_id, points).await
        }

        async fn account(&self, player_id: &str) -> LedgerResult<Option<Account>> {
            self.inner.account(player_id).await
        }

        async fn insert_tournament(&self, tournament: &Tournament) -> LedgerResult<bool> {
            self.inner.insert_tournament(tournament).await
        }

        async fn tournament(&self, tournament_id: &str) -> LedgerResult<Option<Tournament>> {
            self.inner.tournament(tournament_id).await
        }

        async fn entries(&self, tournament_id: &str) -> LedgerResult<Vec<Entry>> {
            self.inner.entries(tournament_id).await
        }

        async fn reset(&self) -> LedgerResult<()> {
            self.inner.reset().await
        }

        async fn ping(&self) -> LedgerResult<()> {
            self.inner.ping().await
        }
    }

    #[async_trait]
    impl LedgerTransaction for SlowCommitTransaction {
        async fn open_tournament(
            &mut self,
            tournament_id: &str,
        ) -> LedgerResult<Option<Tournament>> {
            self.0.open_tournament(tournament_id).await
        }

        async fn insert_entry(&mut self, entry: &Entry) -> LedgerResult<bool> {
            self.0.insert_entry(entry).await
        }

        async fn entry(
            &mut self,
            tournament_id: &str,
            player_id: &str,
        ) -> LedgerResult<Option<Entry>> {
            self.0.entry(tournament_id, player_id).await
        }

        async fn lock_accounts(&mut self, player_ids: &[PlayerId]) -> LedgerResult<()> {
            self.0.lock_accounts(player_ids).await
        }

        async fn debit(&mut self, player_id: &str, points: i64) -> LedgerResult<u64> {
            self.0.debit(player_id, points).await
        }

        async fn credit(&mut self, player_id: &str, points: i64) -> LedgerResult<u64> {
            self.0.credit(player_id, points).await
        }

        async fn finish_tournament(&mut self, tournament_id: &str) -> LedgerResult<u64> {
            self.0.finish_tournament(tournament_id).await
        }

        async fn commit(self) -> LedgerResult<()> {
            tokio::time::sleep(SLOW_COMMIT).await;
            self.0.commit().await
        }

        async fn rollback(self) -> LedgerResult<()> {
            self.0.rollback().await
        }
    }

    async fn setup() -> (
        WalletManager<MemoryLedgerStore>,
        TournamentManager<MemoryLedgerStore>,
    ) {
        let store = MemoryLedgerStore::new();
        (
            WalletManager::new(store.clone()),
            TournamentManager::new(store),
        )
    }

    #[tokio::test]
    async fn test_announce_rejects_duplicates_and_bad_deposit() {
        let (_, tournaments) = setup().await;

        tournaments.announce("1", 1000).await.unwrap();
        assert!(matches!(
            tournaments.announce("1", 500).await,
            Err(LedgerError::Conflict(_))
        ));
        assert!(matches!(
            tournaments.announce("2", 0).await,
            Err(LedgerError::InvalidInput(_))
        ));
        assert_eq!(tournaments.get_tournament("1").await.unwrap().deposit, 1000);
    }

    #[tokio::test]
    async fn test_solo_join_pays_full_deposit() {
        let (wallet, tournaments) = setup().await;
        wallet.fund("P5", 1000).await.unwrap();
        tournaments.announce("1", 1000).await.unwrap();

        let entry = tournaments.join("1", "P5", vec![]).await.unwrap();

        assert!(entry.backers.is_empty());
        assert_eq!(wallet.balance("P5").await.unwrap().balance, 0);
    }

    #[tokio::test]
    async fn test_join_unknown_tournament() {
        let (wallet, tournaments) = setup().await;
        wallet.fund("P1", 300).await.unwrap();

        let err = tournaments.join("404", "P1", vec![]).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
        assert_eq!(wallet.balance("P1").await.unwrap().balance, 300);
    }

    #[tokio::test]
    async fn test_result_with_no_winners_finishes() {
        let (_, tournaments) = setup().await;
        tournaments.announce("1", 1000).await.unwrap();

        let payouts = tournaments.result("1", &[]).await.unwrap();

        assert!(payouts.is_empty());
        assert!(tournaments.get_tournament("1").await.unwrap().finished);
    }

    #[tokio::test]
    async fn test_negative_prize_rejected_before_finishing() {
        let (_, tournaments) = setup().await;
        tournaments.announce("1", 1000).await.unwrap();

        let err = tournaments
            .result("1", &[Winner::new("P1", -1)])
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::InvalidInput(_)));
        assert!(!tournaments.get_tournament("1").await.unwrap().finished);
    }

    #[tokio::test]
    async fn test_entries_of_unknown_tournament() {
        let (_, tournaments) = setup().await;
        assert!(matches!(
            tournaments.entries("nope").await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_commit_runs_outside_transaction_timeout() {
        let store = SlowCommitStore::default();
        let wallet = WalletManager::new(store.clone());
        let tournaments =
            TournamentManager::new(store).with_transaction_timeout(SLOW_COMMIT / 5);
        wallet.fund("P1", 300).await.unwrap();
        wallet.fund("P2", 300).await.unwrap();
        tournaments.announce("1", 400).await.unwrap();

        tournaments.join("1", "P1", vec!["P2".into()]).await.unwrap();
        assert_eq!(wallet.balance("P1").await.unwrap().balance, 100);
        assert_eq!(wallet.balance("P2").await.unwrap().balance, 100);

        let payouts = tournaments
            .result("1", &[Winner::new("P1", 1000)])
            .await
            .unwrap();
        assert_eq!(payouts.len(), 2);
        assert_eq!(wallet.balance("P1").await.unwrap().balance, 600);
        assert_eq!(wallet.balance("P2").await.unwrap().balance, 600);
    }

    #[tokio::test]
    async fn test_cross_backed_joins_both_succeed() {
        let (wallet, tournaments) = setup().await;
        wallet.fund("A", 1000).await.unwrap();
        wallet.fund("B", 1000).await.unwrap();
        tournaments.announce("1", 1000).await.unwrap();

        let (a, b) = tokio::join!(
            tournaments.join("1", "A", vec!["B".into()]),
            tournaments.join("1", "B", vec!["A".into()]),
        );

        a.unwrap();
        b.unwrap();
        assert_eq!(wallet.balance("A").await.unwrap().balance, 0);
        assert_eq!(wallet.balance("B").await.unwrap().balance, 0);
    }
}
