//! Tournament data models for Swiss-system play.

use super::errors::{TournamentError, TournamentResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Player ID type
pub type PlayerId = i64;

/// Tournament grouping tag type
pub type TournamentId = i64;

/// Match record ID type
pub type MatchId = i64;

/// The grouping a player or match belongs to.
///
/// Every player is registered into exactly one scope, and every scoped
/// operation only sees players and matches carrying the same scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// No tournament tag
    #[default]
    Ungrouped,
    /// Tagged with a tournament ID
    Tournament(TournamentId),
}

impl Scope {
    /// Tournament tag as stored in the database (`NULL` for ungrouped)
    pub fn tournament_id(self) -> Option<TournamentId> {
        match self {
            Scope::Ungrouped => None,
            Scope::Tournament(id) => Some(id),
        }
    }

    /// Reject tournament tags that are not positive
    pub fn validate(self) -> TournamentResult<Self> {
        match self {
            Scope::Tournament(id) if id <= 0 => Err(TournamentError::InvalidScope(id)),
            scope => Ok(scope),
        }
    }
}

impl From<Option<TournamentId>> for Scope {
    fn from(tag: Option<TournamentId>) -> Self {
        tag.map_or(Scope::Ungrouped, Scope::Tournament)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Ungrouped => write!(f, "ungrouped"),
            Scope::Tournament(id) => write!(f, "tournament {id}"),
        }
    }
}

/// Registered player with aggregate results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player ID (assigned by the store, immutable)
    pub id: PlayerId,
    /// Display name (not unique)
    pub name: String,
    /// Scope the player was registered into
    pub scope: Scope,
    /// Matches won
    pub wins: u32,
    /// Matches played, wins and losses and draws alike
    pub matches: u32,
}

impl Player {
    /// Create a freshly registered player with no results
    pub fn new(id: PlayerId, name: impl Into<String>, scope: Scope) -> Self {
        Self {
            id,
            name: name.into(),
            scope,
            wins: 0,
            matches: 0,
        }
    }
}

/// One row of the standings table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub id: PlayerId,
    pub name: String,
    pub wins: u32,
    pub matches: u32,
}

impl From<Player> for Standing {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            name: player.name,
            wins: player.wins,
            matches: player.matches,
        }
    }
}

/// Proposed next-round pairing of two players adjacent in the standings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub id1: PlayerId,
    pub name1: String,
    pub id2: PlayerId,
    pub name2: String,
}

impl Pairing {
    /// Build a pairing from two standings rows, higher-ranked first
    pub fn between(first: &Standing, second: &Standing) -> Self {
        Self {
            id1: first.id,
            name1: first.name.clone(),
            id2: second.id,
            name2: second.name.clone(),
        }
    }

    /// Unordered key of the two players
    pub fn key(&self) -> PairKey {
        PairKey::new(self.id1, self.id2)
    }
}

/// Unordered pair of player IDs, stored lowest ID first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    low: PlayerId,
    high: PlayerId,
}

impl PairKey {
    /// Normalize two player IDs into a pair key
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn low(&self) -> PlayerId {
        self.low
    }

    pub fn high(&self) -> PlayerId {
        self.high
    }

    /// Text key for advisory locking, unique per pair and scope
    pub fn lock_key(&self, scope: Scope) -> String {
        match scope.tournament_id() {
            Some(tournament_id) => format!("swiss:{tournament_id}:{}:{}", self.low, self.high),
            None => format!("swiss:-:{}:{}", self.low, self.high),
        }
    }
}

/// Outcome of a single match as reported by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Winner, or first participant of a draw
    pub winner_id: PlayerId,
    /// Loser, or second participant of a draw
    pub loser_id: PlayerId,
    /// When true neither participant is credited with a win
    pub draw: bool,
    /// Scope the match is recorded in
    pub scope: Scope,
}

impl MatchReport {
    /// Decisive result in the ungrouped scope
    pub fn win(winner_id: PlayerId, loser_id: PlayerId) -> Self {
        Self {
            winner_id,
            loser_id,
            draw: false,
            scope: Scope::Ungrouped,
        }
    }

    /// Drawn result in the ungrouped scope
    pub fn draw(first_id: PlayerId, second_id: PlayerId) -> Self {
        Self {
            draw: true,
            ..Self::win(first_id, second_id)
        }
    }

    /// Record the result in a specific scope
    pub fn in_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(self.winner_id, self.loser_id)
    }

    /// Wins credited to the first participant
    pub fn winner_wins_delta(&self) -> i32 {
        if self.draw { 0 } else { 1 }
    }
}

/// Persisted entry of the match ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
    pub draw: bool,
    pub scope: Scope,
    pub recorded_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn key(&self) -> PairKey {
        PairKey::new(self.winner_id, self.loser_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_unordered() {
        assert_eq!(PairKey::new(7, 3), PairKey::new(3, 7));
        let key = PairKey::new(9, 2);
        assert_eq!(key.low(), 2);
        assert_eq!(key.high(), 9);
    }

    #[test]
    fn test_lock_key_distinguishes_scopes() {
        let key = PairKey::new(1, 2);
        assert_eq!(key.lock_key(Scope::Ungrouped), "swiss:-:1:2");
        assert_eq!(key.lock_key(Scope::Tournament(5)), "swiss:5:1:2");
    }

    #[test]
    fn test_scope_from_optional_tag() {
        assert_eq!(Scope::from(None), Scope::Ungrouped);
        assert_eq!(Scope::from(Some(4)), Scope::Tournament(4));
        assert_eq!(Scope::Tournament(4).tournament_id(), Some(4));
        assert_eq!(Scope::Ungrouped.tournament_id(), None);
    }

    #[test]
    fn test_scope_validation() {
        assert_eq!(Scope::Ungrouped.validate().unwrap(), Scope::Ungrouped);
        assert_eq!(Scope::Tournament(1).validate().unwrap(), Scope::Tournament(1));
        assert!(matches!(
            Scope::Tournament(0).validate(),
            Err(TournamentError::InvalidScope(0))
        ));
        assert!(matches!(
            Scope::Tournament(-3).validate(),
            Err(TournamentError::InvalidScope(-3))
        ));
    }

    #[test]
    fn test_draw_report_credits_no_win() {
        let report = MatchReport::draw(1, 2).in_scope(Scope::Tournament(3));
        assert!(report.draw);
        assert_eq!(report.winner_wins_delta(), 0);
        assert_eq!(report.scope, Scope::Tournament(3));
        assert_eq!(MatchReport::win(1, 2).winner_wins_delta(), 1);
    }

    #[test]
    fn test_new_player_has_no_results() {
        let player = Player::new(1, "Ada", Scope::Ungrouped);
        assert_eq!(player.wins, 0);
        assert_eq!(player.matches, 0);
        assert_eq!(Standing::from(player).name, "Ada");
    }
}
