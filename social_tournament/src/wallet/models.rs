//! Wallet data models.

use serde::{Deserialize, Serialize};

/// Player ID type
pub type PlayerId = String;

/// Player account: a balance in points, never negative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "playerId")]
    pub id: PlayerId,
    pub balance: i64,
}

impl Account {
    pub fn new(id: impl Into<PlayerId>, balance: i64) -> Self {
        Self {
            id: id.into(),
            balance,
        }
    }
}
