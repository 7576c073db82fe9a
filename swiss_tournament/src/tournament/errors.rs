//! Tournament error types.

use super::models::{PlayerId, TournamentId};
use sqlx::postgres::PgDatabaseError;
use std::time::Duration;
use thiserror::Error;

/// Unique index holding one row per unordered pair and scope
const PAIR_INDEX: &str = "idx_matches_unique_pair";

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    /// Storage unreachable (I/O, TLS, pool exhausted or closed)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Storage call exceeded its time bound
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// The unordered pair already has a recorded match in scope
    #[error("Players {first} and {second} have already been paired")]
    DuplicatePairing { first: PlayerId, second: PlayerId },

    /// Pairings need an even number of players in scope
    #[error("Cannot pair an odd number of players: {0}")]
    OddPlayerCount(usize),

    /// Player does not exist in scope
    #[error("Player not found: {0}")]
    NotFound(PlayerId),

    /// A player cannot play against themselves
    #[error("Player {0} cannot be matched against themselves")]
    SamePlayer(PlayerId),

    /// Player names must contain at least one visible character
    #[error("Player name must not be empty")]
    InvalidName,

    /// Tournament tags are positive integers
    #[error("Invalid tournament tag: {0} (must be greater than 0)")]
    InvalidScope(TournamentId),
}

impl TournamentError {
    /// Get a client-safe error message that doesn't leak storage internals
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Connection(_) => "Storage unavailable".to_string(),
            TournamentError::Database(_) => "Internal storage error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether the error came from the storage layer rather than a rule violation
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            TournamentError::Connection(_)
                | TournamentError::Timeout(_)
                | TournamentError::Database(_)
        )
    }
}

impl From<sqlx::Error> for TournamentError {
    fn from(err: sqlx::Error) -> Self {
        if let Some((first, second)) = violated_pair(&err) {
            return TournamentError::DuplicatePairing { first, second };
        }

        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => TournamentError::Connection(err.to_string()),
            other => TournamentError::Database(other),
        }
    }
}

/// Pair named by a unique violation on the pair index, lowest ID first
fn violated_pair(err: &sqlx::Error) -> Option<(PlayerId, PlayerId)> {
    let db = err.as_database_error()?;
    if !db.is_unique_violation() || db.constraint() != Some(PAIR_INDEX) {
        return None;
    }
    let detail = db.try_downcast_ref::<PgDatabaseError>()?.detail()?;
    pair_from_key_detail(detail)
}

/// Parse the key values out of a detail such as
/// `Key (LEAST(winner_id, loser_id), ...)=(3, 8, -1) already exists.`
fn pair_from_key_detail(detail: &str) -> Option<(PlayerId, PlayerId)> {
    let (_, values) = detail.split_once(")=(")?;
    let (values, _) = values.split_once(')')?;
    let mut ids = values.split(',').map(|v| v.trim().parse::<PlayerId>());
    match (ids.next()?, ids.next()?) {
        (Ok(low), Ok(high)) => Some((low, high)),
        _ => None,
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
