//! # Social Tournament
//!
//! A points ledger for a social tournament game. Players hold balances, enter
//! tournaments alone or backed by other players who split the entry deposit,
//! and share the prize with those backers when they win.
//!
//! ## Architecture
//!
//! Every money-moving operation goes through a [`store::LedgerStore`]:
//!
//! - **Fund / Take**: single-statement upsert and conditional decrement
//! - **Join**: entry insert plus one debit per participant, in one transaction
//! - **Result**: finish flag plus one credit per recipient of every winning
//!   entry, in one transaction
//!
//! A failed join or result rolls back completely; balances never go negative
//! and a tournament is settled at most once.
//!
//! ## Core Modules
//!
//! - [`wallet`]: accounts, funding, debits, balances, reset
//! - [`tournament`]: announcement, backed entries, settlement
//! - [`store`]: storage abstraction with PostgreSQL and in-memory backends
//! - [`db`]: connection pool, configuration, schema, timeouts
//!
//! ## Example
//!
//! ```
//! use social_tournament::store::MemoryLedgerStore;
//! use social_tournament::wallet::WalletManager;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), social_tournament::LedgerError> {
//! let wallet = WalletManager::new(MemoryLedgerStore::new());
//! wallet.fund("P1", 300).await?;
//! assert_eq!(wallet.balance("P1").await?.balance, 300);
//! # Ok(())
//! # }
//! ```

/// Database connection pool, configuration and schema.
pub mod db;

/// Ledger error types.
pub mod errors;
pub use errors::{ErrorKind, LedgerError, LedgerResult};

/// Storage backends.
pub mod store;
pub use store::{LedgerStore, LedgerTransaction, MemoryLedgerStore, PgLedgerStore};

/// Tournament announcement, join and settlement.
pub mod tournament;

/// Player accounts and balance operations.
pub mod wallet;
