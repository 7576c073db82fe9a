//! Tournament manager exposing registration, standings, pairings and match
//! reporting over a storage repository.

use super::errors::{TournamentError, TournamentResult};
use super::ledger::MatchLedger;
use super::models::{MatchId, MatchRecord, MatchReport, Pairing, PlayerId, Scope, Standing};
use super::{pairing, standings};
use crate::db::repository::TournamentRepository;
use log::{debug, info};
use std::sync::Arc;

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    repo: Arc<dyn TournamentRepository>,
    ledger: MatchLedger,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(repo: Arc<dyn TournamentRepository>) -> Self {
        let ledger = MatchLedger::new(repo.clone());
        Self { repo, ledger }
    }

    /// Register a player into a scope
    ///
    /// Names are trimmed and need not be unique.
    ///
    /// # Errors
    ///
    /// * `TournamentError::InvalidName` - name is empty after trimming
    /// * `TournamentError::InvalidScope` - tournament tag is not positive
    pub async fn register_player(&self, name: &str, scope: Scope) -> TournamentResult<PlayerId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::InvalidName);
        }
        scope.validate()?;

        let id = self.repo.create_player(name, scope).await?;
        info!("Registered player {} as #{} ({})", name, id, scope);
        Ok(id)
    }

    /// Number of players registered across all scopes
    pub async fn count_players(&self) -> TournamentResult<u64> {
        self.repo.count_players(None).await
    }

    /// Number of players registered in one scope
    pub async fn count_players_in(&self, scope: Scope) -> TournamentResult<u64> {
        self.repo.count_players(Some(scope)).await
    }

    /// Current standings, most wins first, ties broken by player ID
    pub async fn standings(&self, scope: Scope) -> TournamentResult<Vec<Standing>> {
        let players = self.repo.fetch_players(scope).await?;
        debug!("Ranking {} players ({})", players.len(), scope);
        Ok(standings::rank(players))
    }

    /// Pair players adjacent in the current standings for the next round
    ///
    /// # Errors
    ///
    /// * `TournamentError::OddPlayerCount` - the scope has an odd number of players
    pub async fn swiss_pairings(&self, scope: Scope) -> TournamentResult<Vec<Pairing>> {
        let standings = self.standings(scope).await?;
        pairing::pair_adjacent(&standings)
    }

    /// Record the outcome of a match, see [`MatchLedger::report`]
    pub async fn report_match(&self, report: MatchReport) -> TournamentResult<MatchId> {
        self.ledger.report(report).await
    }

    /// Recorded matches of a scope, oldest first
    pub async fn match_history(&self, scope: Scope) -> TournamentResult<Vec<MatchRecord>> {
        self.repo.fetch_matches(scope).await
    }

    /// Remove all matches of a scope and reset its players' results
    ///
    /// Pairs that already met may be reported again afterwards.
    pub async fn delete_matches(&self, scope: Scope) -> TournamentResult<u64> {
        scope.validate()?;
        let deleted = self.repo.delete_all_matches(scope).await?;
        info!("Deleted {} matches and reset results ({})", deleted, scope);
        Ok(deleted)
    }

    /// Remove every player and, with them, every match
    pub async fn delete_players(&self) -> TournamentResult<u64> {
        let deleted = self.repo.delete_all_players().await?;
        info!("Deleted {} players", deleted);
        Ok(deleted)
    }
}
