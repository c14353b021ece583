//! Storage abstraction behind the ledger.
//!
//! [`LedgerStore`] covers single-statement operations and opens
//! [`LedgerTransaction`]s for the multi-row protocols (join and settlement).
//! A transaction applies nothing until [`LedgerTransaction::commit`]; dropping
//! it, or calling [`LedgerTransaction::rollback`], discards every step.
//!
//! Two backends are provided:
//! - [`PgLedgerStore`]: PostgreSQL through sqlx
//! - [`MemoryLedgerStore`]: process-local state, used by tests and benches

use async_trait::async_trait;

use crate::errors::LedgerResult;
use crate::tournament::{Entry, Tournament};
use crate::wallet::{Account, PlayerId};

pub mod memory;
pub mod postgres;

pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

/// Durable accounts, tournaments and entries
#[async_trait]
pub trait LedgerStore: Clone + Send + Sync + 'static {
    /// Transaction handle returned by [`LedgerStore::begin`]
    type Transaction: LedgerTransaction;

    /// Open a transaction
    async fn begin(&self) -> LedgerResult<Self::Transaction>;

    /// Create the account with `points`, or add `points` to it. Returns the new balance.
    async fn fund(&self, player_id: &str, points: i64) -> LedgerResult<i64>;

    /// Subtract `points` only if the balance covers it. Returns rows affected (0 or 1).
    async fn debit(&self, player_id: &str, points: i64) -> LedgerResult<u64>;

    /// Look up an account
    async fn account(&self, player_id: &str) -> LedgerResult<Option<Account>>;

    /// Insert a tournament. Returns `false` if the id is taken.
    async fn insert_tournament(&self, tournament: &Tournament) -> LedgerResult<bool>;

    /// Look up a tournament in any state
    async fn tournament(&self, tournament_id: &str) -> LedgerResult<Option<Tournament>>;

    /// Entries of a tournament in join order
    async fn entries(&self, tournament_id: &str) -> LedgerResult<Vec<Entry>>;

    /// Remove every account, tournament and entry in one step
    async fn reset(&self) -> LedgerResult<()>;

    /// Cheap liveness check of the backing storage
    async fn ping(&self) -> LedgerResult<()>;
}

/// Steps of a join or settlement, applied atomically on commit
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Tournament that exists and is not finished, locked against concurrent settlement
    async fn open_tournament(&mut self, tournament_id: &str) -> LedgerResult<Option<Tournament>>;

    /// Insert an entry. Returns `false` if the player already has one in this tournament.
    async fn insert_entry(&mut self, entry: &Entry) -> LedgerResult<bool>;

    /// Entry of `player_id` in `tournament_id`
    async fn entry(&mut self, tournament_id: &str, player_id: &str)
    -> LedgerResult<Option<Entry>>;

    /// Lock the accounts of `player_ids` for the rest of the transaction
    ///
    /// Locks are taken in id order whatever order the ids are given in, so two
    /// transactions touching overlapping accounts queue instead of deadlocking.
    /// Unknown ids are skipped.
    async fn lock_accounts(&mut self, player_ids: &[PlayerId]) -> LedgerResult<()>;

    /// Conditional decrement. Returns rows affected (0 or 1).
    async fn debit(&mut self, player_id: &str, points: i64) -> LedgerResult<u64>;

    /// Unconditional increment of an existing account. Returns rows affected (0 or 1).
    async fn credit(&mut self, player_id: &str, points: i64) -> LedgerResult<u64>;

    /// Flip `finished` to true if currently false. Returns rows affected (0 or 1).
    async fn finish_tournament(&mut self, tournament_id: &str) -> LedgerResult<u64>;

    /// Apply every step
    async fn commit(self) -> LedgerResult<()>;

    /// Discard every step
    async fn rollback(self) -> LedgerResult<()>;
}
