//! Tournament module: announcing, backed entries, and result settlement.
//!
//! This module provides:
//! - Tournament announcement with an entry deposit
//! - Joining, alone or backed by other players who split the deposit
//! - Result settlement paying each winning entry's backers and player
//!
//! Join and settlement each run in a single store transaction and are
//! all-or-nothing.
//!
//! ## Example
//!
//! ```no_run
//! use social_tournament::store::MemoryLedgerStore;
//! use social_tournament::tournament::{TournamentManager, Winner};
//! use social_tournament::wallet::WalletManager;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryLedgerStore::new();
//!     let wallet = WalletManager::new(store.clone());
//!     let tournaments = TournamentManager::new(store);
//!
//!     for player in ["P1", "P2", "P3"] {
//!         wallet.fund(player, 300).await?;
//!     }
//!     tournaments.announce("1", 900).await?;
//!
//!     // P1 enters backed by P2 and P3: each pays 300
//!     tournaments.join("1", "P1", vec!["P2".into(), "P3".into()]).await?;
//!
//!     // P1 wins 1500: P2, P3 and P1 receive 500 each
//!     tournaments.result("1", &[Winner::new("P1", 1500)]).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod manager;
pub mod models;

pub use manager::TournamentManager;
pub use models::{Entry, Payout, Tournament, TournamentId, Winner, share_for, stake_for};
