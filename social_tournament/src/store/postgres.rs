//! PostgreSQL ledger store.
#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::sync::Arc;

use super::{LedgerStore, LedgerTransaction};
use crate::errors::LedgerResult;
use crate::tournament::{Entry, Tournament};
use crate::wallet::{Account, PlayerId};

const DEBIT_SQL: &str = "UPDATE accounts
     SET balance = balance - $1
     WHERE id = $2 AND balance >= $1";

const CREDIT_SQL: &str = "UPDATE accounts
     SET balance = balance + $1
     WHERE id = $2";

/// Ledger store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: Arc<PgPool>,
}

impl PgLedgerStore {
    /// Create a store over an existing pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn tournament_from_row(row: &PgRow) -> Tournament {
    Tournament {
        id: row.get("id"),
        deposit: row.get("deposit"),
        finished: row.get("finished"),
    }
}

fn entry_from_row(row: &PgRow) -> Entry {
    Entry {
        tournament_id: row.get("tournament_id"),
        player_id: row.get("player_id"),
        backers: row.get::<Vec<String>, _>("backers"),
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Transaction = PgLedgerTransaction;

    async fn begin(&self) -> LedgerResult<PgLedgerTransaction> {
        let tx = self.pool.begin().await?;
        Ok(PgLedgerTransaction { tx })
    }

    async fn fund(&self, player_id: &str, points: i64) -> LedgerResult<i64> {
        // Single upsert so concurrent first fundings of one id cannot race
        let row = sqlx::query(
            "INSERT INTO accounts (id, balance)
             VALUES ($1, $2)
             ON CONFLICT (id)
             DO UPDATE SET balance = accounts.balance + EXCLUDED.balance
             RETURNING balance",
        )
        .bind(player_id)
        .bind(points)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.get("balance"))
    }

    async fn debit(&self, player_id: &str, points: i64) -> LedgerResult<u64> {
        let result = sqlx::query(DEBIT_SQL)
            .bind(points)
            .bind(player_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    async fn account(&self, player_id: &str) -> LedgerResult<Option<Account>> {
        let row = sqlx::query("SELECT id, balance FROM accounts WHERE id = $1")
            .bind(player_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(|r| Account {
            id: r.get("id"),
            balance: r.get("balance"),
        }))
    }

    async fn insert_tournament(&self, tournament: &Tournament) -> LedgerResult<bool> {
        let result = sqlx::query(
            "INSERT INTO tournaments (id, deposit, finished)
             VALUES ($1, $2, $3)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&tournament.id)
        .bind(tournament.deposit)
        .bind(tournament.finished)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn tournament(&self, tournament_id: &str) -> LedgerResult<Option<Tournament>> {
        let row = sqlx::query("SELECT id, deposit, finished FROM tournaments WHERE id = $1")
            .bind(tournament_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.as_ref().map(tournament_from_row))
    }

    async fn entries(&self, tournament_id: &str) -> LedgerResult<Vec<Entry>> {
        let rows = sqlx::query(
            r#"
            SELECT tournament_id, player_id, backers
            FROM tournament_entries
            WHERE tournament_id = $1
            ORDER BY id
            "#,
        )
        .bind(tournament_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.iter().map(entry_from_row).collect())
    }

    async fn reset(&self) -> LedgerResult<()> {
        sqlx::query("TRUNCATE tournament_entries, tournaments, accounts")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn ping(&self) -> LedgerResult<()> {
        sqlx::query("SELECT 1").fetch_one(self.pool.as_ref()).await?;
        Ok(())
    }
}

/// Open PostgreSQL transaction; rolls back when dropped uncommitted
pub struct PgLedgerTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTransaction for PgLedgerTransaction {
    async fn open_tournament(&mut self, tournament_id: &str) -> LedgerResult<Option<Tournament>> {
        // FOR SHARE blocks a concurrent settlement's UPDATE until this transaction ends
        let row = sqlx::query(
            "SELECT id, deposit, finished FROM tournaments
             WHERE id = $1 AND finished = FALSE
             FOR SHARE",
        )
        .bind(tournament_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.as_ref().map(tournament_from_row))
    }

    async fn insert_entry(&mut self, entry: &Entry) -> LedgerResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO tournament_entries (tournament_id, player_id, backers)
            VALUES ($1, $2, $3)
            ON CONFLICT (tournament_id, player_id) DO NOTHING
            "#,
        )
        .bind(&entry.tournament_id)
        .bind(&entry.player_id)
        .bind(entry.backers.as_slice())
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn entry(
        &mut self,
        tournament_id: &str,
        player_id: &str,
    ) -> LedgerResult<Option<Entry>> {
        let row = sqlx::query(
            "SELECT tournament_id, player_id, backers FROM tournament_entries
             WHERE tournament_id = $1 AND player_id = $2",
        )
        .bind(tournament_id)
        .bind(player_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.as_ref().map(entry_from_row))
    }

    async fn lock_accounts(&mut self, player_ids: &[PlayerId]) -> LedgerResult<()> {
        // Rows are locked as the sorted scan returns them
        sqlx::query("SELECT id FROM accounts WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(player_ids)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn debit(&mut self, player_id: &str, points: i64) -> LedgerResult<u64> {
        let result = sqlx::query(DEBIT_SQL)
            .bind(points)
            .bind(player_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn credit(&mut self, player_id: &str, points: i64) -> LedgerResult<u64> {
        let result = sqlx::query(CREDIT_SQL)
            .bind(points)
            .bind(player_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn finish_tournament(&mut self, tournament_id: &str) -> LedgerResult<u64> {
        let result =
            sqlx::query("UPDATE tournaments SET finished = TRUE WHERE id = $1 AND finished = FALSE")
                .bind(tournament_id)
                .execute(&mut *self.tx)
                .await?;

        Ok(result.rows_affected())
    }

    async fn commit(self) -> LedgerResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> LedgerResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
