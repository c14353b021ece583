//! Tournament data models and the split arithmetic shared by join and settlement.

use crate::wallet::PlayerId;
use serde::{Deserialize, Serialize};

/// Tournament ID type
pub type TournamentId = String;

/// Tournament record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    /// Entry deposit, split between the entrant and their backers
    pub deposit: i64,
    pub finished: bool,
}

impl Tournament {
    /// A freshly announced tournament
    pub fn announced(id: impl Into<TournamentId>, deposit: i64) -> Self {
        Self {
            id: id.into(),
            deposit,
            finished: false,
        }
    }

    /// Points each participant of an entry with `backer_count` backers pays
    pub fn stake(&self, backer_count: usize) -> i64 {
        stake_for(self.deposit, backer_count)
    }
}

/// One player's participation in a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub tournament_id: TournamentId,
    pub player_id: PlayerId,
    /// Backers in the order given at join time, duplicates included
    pub backers: Vec<PlayerId>,
}

impl Entry {
    pub fn new(
        tournament_id: impl Into<TournamentId>,
        player_id: impl Into<PlayerId>,
        backers: Vec<PlayerId>,
    ) -> Self {
        Self {
            tournament_id: tournament_id.into(),
            player_id: player_id.into(),
            backers,
        }
    }

    /// Everyone debited on join: the player first, then each backer
    pub fn payers(&self) -> impl Iterator<Item = &PlayerId> {
        std::iter::once(&self.player_id).chain(self.backers.iter())
    }

    /// Everyone credited on a win: each backer, then the player
    pub fn recipients(&self) -> impl Iterator<Item = &PlayerId> {
        self.backers.iter().chain(std::iter::once(&self.player_id))
    }

    /// Number of accounts sharing this entry's stake and prize
    pub fn participant_count(&self) -> usize {
        self.backers.len() + 1
    }
}

/// A declared winner and the prize assigned to their entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    pub prize: i64,
}

impl Winner {
    pub fn new(player_id: impl Into<PlayerId>, prize: i64) -> Self {
        Self {
            player_id: player_id.into(),
            prize,
        }
    }
}

/// Points credited to one recipient during settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    pub points: i64,
}

impl Payout {
    pub fn new(player_id: impl Into<PlayerId>, points: i64) -> Self {
        Self {
            player_id: player_id.into(),
            points,
        }
    }
}

/// Stake per participant: `deposit / (1 + backers)`, rounded down.
///
/// The remainder is not collected from anyone.
pub fn stake_for(deposit: i64, backer_count: usize) -> i64 {
    deposit / (backer_count as i64 + 1)
}

/// Share per recipient: `prize / recipients`, rounded down.
///
/// The remainder is not paid to anyone. `recipients` is never zero for a
/// recorded entry (the player is always a recipient).
pub fn share_for(prize: i64, recipients: usize) -> i64 {
    prize / recipients.max(1) as i64
}
