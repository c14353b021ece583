//! In-memory ledger store.
//!
//! Transactions are serialized: [`MemoryLedgerStore::begin`] takes the state
//! lock (fair, first come first served) and holds it until the transaction is
//! committed or dropped. Steps are applied to a staged copy that replaces the
//! shared state on commit.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{LedgerStore, LedgerTransaction};
use crate::errors::{LedgerError, LedgerResult};
use crate::tournament::{Entry, Tournament, TournamentId};
use crate::wallet::{Account, PlayerId};

#[derive(Debug, Clone, Default)]
struct LedgerState {
    accounts: HashMap<PlayerId, i64>,
    tournaments: HashMap<TournamentId, Tournament>,
    entries: HashMap<TournamentId, Vec<Entry>>,
}

impl LedgerState {
    fn debit(&mut self, player_id: &str, points: i64) -> u64 {
        match self.accounts.get_mut(player_id) {
            Some(balance) if *balance >= points => {
                *balance -= points;
                1
            }
            _ => 0,
        }
    }

    fn credit(&mut self, player_id: &str, points: i64) -> LedgerResult<u64> {
        match self.accounts.get_mut(player_id) {
            Some(balance) => {
                *balance = balance
                    .checked_add(points)
                    .ok_or(LedgerError::BalanceOverflow)?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn entry(&self, tournament_id: &str, player_id: &str) -> Option<&Entry> {
        self.entries
            .get(tournament_id)?
            .iter()
            .find(|e| e.player_id == player_id)
    }
}

/// Process-local ledger store
#[derive(Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all balances
    pub async fn total_balance(&self) -> i64 {
        self.state.lock().await.accounts.values().sum()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    type Transaction = MemoryLedgerTransaction;

    async fn begin(&self) -> LedgerResult<MemoryLedgerTransaction> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryLedgerTransaction { guard, staged })
    }

    async fn fund(&self, player_id: &str, points: i64) -> LedgerResult<i64> {
        let mut state = self.state.lock().await;
        let balance = state.accounts.entry(player_id.to_string()).or_insert(0);
        *balance = balance
            .checked_add(points)
            .ok_or(LedgerError::BalanceOverflow)?;
        Ok(*balance)
    }

    async fn debit(&self, player_id: &str, points: i64) -> LedgerResult<u64> {
        Ok(self.state.lock().await.debit(player_id, points))
    }

    async fn account(&self, player_id: &str) -> LedgerResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .get(player_id)
            .map(|balance| Account::new(player_id, *balance)))
    }

    async fn insert_tournament(&self, tournament: &Tournament) -> LedgerResult<bool> {
        let mut state = self.state.lock().await;
        if state.tournaments.contains_key(&tournament.id) {
            return Ok(false);
        }
        state
            .tournaments
            .insert(tournament.id.clone(), tournament.clone());
        Ok(true)
    }

    async fn tournament(&self, tournament_id: &str) -> LedgerResult<Option<Tournament>> {
        Ok(self.state.lock().await.tournaments.get(tournament_id).cloned())
    }

    async fn entries(&self, tournament_id: &str) -> LedgerResult<Vec<Entry>> {
        Ok(self
            .state
            .lock()
            .await
            .entries
            .get(tournament_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn reset(&self) -> LedgerResult<()> {
        *self.state.lock().await = LedgerState::default();
        Ok(())
    }

    async fn ping(&self) -> LedgerResult<()> {
        Ok(())
    }
}

/// Exclusive, staged view of the in-memory ledger
pub struct MemoryLedgerTransaction {
    guard: OwnedMutexGuard<LedgerState>,
    staged: LedgerState,
}

#[async_trait]
impl LedgerTransaction for MemoryLedgerTransaction {
    async fn open_tournament(&mut self, tournament_id: &str) -> LedgerResult<Option<Tournament>> {
        Ok(self
            .staged
            .tournaments
            .get(tournament_id)
            .filter(|t| !t.finished)
            .cloned())
    }

    async fn insert_entry(&mut self, entry: &Entry) -> LedgerResult<bool> {
        if self
            .staged
            .entry(&entry.tournament_id, &entry.player_id)
            .is_some()
        {
            return Ok(false);
        }
        self.staged
            .entries
            .entry(entry.tournament_id.clone())
            .or_default()
            .push(entry.clone());
        Ok(true)
    }

    async fn entry(
        &mut self,
        tournament_id: &str,
        player_id: &str,
    ) -> LedgerResult<Option<Entry>> {
        Ok(self.staged.entry(tournament_id, player_id).cloned())
    }

    async fn lock_accounts(&mut self, _player_ids: &[PlayerId]) -> LedgerResult<()> {
        // The state guard already excludes every other transaction
        Ok(())
    }

    async fn debit(&mut self, player_id: &str, points: i64) -> LedgerResult<u64> {
        Ok(self.staged.debit(player_id, points))
    }

    async fn credit(&mut self, player_id: &str, points: i64) -> LedgerResult<u64> {
        self.staged.credit(player_id, points)
    }

    async fn finish_tournament(&mut self, tournament_id: &str) -> LedgerResult<u64> {
        match self.staged.tournaments.get_mut(tournament_id) {
            Some(t) if !t.finished => {
                t.finished = true;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn commit(self) -> LedgerResult<()> {
        let MemoryLedgerTransaction { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self) -> LedgerResult<()> {
        Ok(())
    }
}
