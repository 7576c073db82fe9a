//! Match ledger: records results and enforces that a pair meets only once.

use super::errors::{TournamentError, TournamentResult};
use super::models::{MatchId, MatchReport};
use crate::db::repository::{LedgerTransaction, TournamentRepository};
use crate::db::timeouts::{DEFAULT_TRANSACTION_TIMEOUT, bounded};
use log::{info, warn};
use std::sync::Arc;

/// Records match results against a repository
#[derive(Clone)]
pub struct MatchLedger {
    repo: Arc<dyn TournamentRepository>,
}

impl MatchLedger {
    pub fn new(repo: Arc<dyn TournamentRepository>) -> Self {
        Self { repo }
    }

    /// Record a match result
    ///
    /// The duplicate check, the ledger insert and both counter updates run in
    /// one transaction; on any error nothing is changed.
    ///
    /// # Errors
    ///
    /// * `TournamentError::SamePlayer` - winner and loser are the same player
    /// * `TournamentError::InvalidScope` - the report carries a non-positive tournament tag
    /// * `TournamentError::NotFound` - a participant is not registered in the report's scope
    /// * `TournamentError::DuplicatePairing` - the pair already met in this scope
    /// * `TournamentError::Timeout` - the transaction did not finish in time
    pub async fn report(&self, report: MatchReport) -> TournamentResult<MatchId> {
        if report.winner_id == report.loser_id {
            return Err(TournamentError::SamePlayer(report.winner_id));
        }
        report.scope.validate()?;

        bounded(DEFAULT_TRANSACTION_TIMEOUT, self.record(&report)).await
    }

    async fn record(&self, report: &MatchReport) -> TournamentResult<MatchId> {
        let key = report.key();
        let mut tx = self.repo.begin().await?;

        tx.lock_pair(key, report.scope).await?;

        // Lock rows in ascending ID order so crossing reports cannot deadlock
        for id in [key.low(), key.high()] {
            if tx.fetch_player(id, report.scope).await?.is_none() {
                return Err(abandon(tx, TournamentError::NotFound(id)).await);
            }
        }

        if tx.fetch_match_exists(key, report.scope).await? {
            warn!(
                "Rejected rematch between players {} and {} ({})",
                report.winner_id, report.loser_id, report.scope
            );
            let err = TournamentError::DuplicatePairing {
                first: report.winner_id,
                second: report.loser_id,
            };
            return Err(abandon(tx, err).await);
        }

        let match_id = tx.insert_match(report).await?;
        tx.update_player_counters(report.winner_id, report.winner_wins_delta(), 1)
            .await?;
        tx.update_player_counters(report.loser_id, 0, 1).await?;
        tx.commit().await?;

        if report.draw {
            info!(
                "Recorded draw #{} between players {} and {} ({})",
                match_id, report.winner_id, report.loser_id, report.scope
            );
        } else {
            info!(
                "Recorded match #{}: player {} beat player {} ({})",
                match_id, report.winner_id, report.loser_id, report.scope
            );
        }

        Ok(match_id)
    }
}

/// Roll back a rejected report, keeping the rejection as the caller's error
async fn abandon(tx: Box<dyn LedgerTransaction>, err: TournamentError) -> TournamentError {
    if let Err(rollback_err) = tx.rollback().await {
        warn!("Rollback after \"{}\" failed: {}", err, rollback_err);
    }
    err
}
