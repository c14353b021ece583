//! Wallet module: player accounts and the primitive balance mutations.
//!
//! This module implements:
//! - Upsert funding (first funding creates the account)
//! - Conditional debits that never drive a balance negative
//! - Balance lookups
//! - Full ledger reset
//!
//! ## Example
//!
//! ```no_run
//! use social_tournament::db::Database;
//! use social_tournament::store::PgLedgerStore;
//! use social_tournament::wallet::WalletManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let wallet = WalletManager::new(PgLedgerStore::new(Arc::new(db.pool().clone())));
//!
//!     wallet.fund("P1", 300).await?;
//!     if wallet.take("P1", 100).await? == 0 {
//!         println!("P1 is unknown or short of points");
//!     }
//!     println!("{:?}", wallet.balance("P1").await?);
//!
//!     Ok(())
//! }
//! ```

pub mod manager;
pub mod models;

pub use manager::WalletManager;
pub use models::{Account, PlayerId};
