//! Repository trait definitions for testability and dependency injection.
//!
//! The tournament core only talks to storage through these traits, so the
//! PostgreSQL implementation below and the in-memory one in
//! [`super::memory`] are interchangeable.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use super::timeouts::{with_default_timeout, with_long_timeout};
use crate::tournament::{
    MatchId, MatchRecord, MatchReport, PairKey, Player, PlayerId, Scope, TournamentError,
    TournamentResult,
};

/// Trait for player and match storage operations
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Create a new player with zeroed results, returning the assigned ID
    async fn create_player(&self, name: &str, scope: Scope) -> TournamentResult<PlayerId>;

    /// Delete every player; their matches go with them
    async fn delete_all_players(&self) -> TournamentResult<u64>;

    /// Delete the match ledger of a scope and zero the counters it fed
    async fn delete_all_matches(&self, scope: Scope) -> TournamentResult<u64>;

    /// Count players, either in one scope or across all of them
    async fn count_players(&self, scope: Option<Scope>) -> TournamentResult<u64>;

    /// Fetch all players registered in a scope, in no particular order
    async fn fetch_players(&self, scope: Scope) -> TournamentResult<Vec<Player>>;

    /// Fetch the match ledger of a scope, oldest first
    async fn fetch_matches(&self, scope: Scope) -> TournamentResult<Vec<MatchRecord>>;

    /// Begin a transaction for recording a match
    async fn begin(&self) -> TournamentResult<Box<dyn LedgerTransaction>>;
}

/// Transactional unit used by the match ledger.
///
/// Nothing is visible to other callers until [`commit`](Self::commit);
/// dropping the transaction without committing rolls it back.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Serialize concurrent reports of the same pair within a scope
    async fn lock_pair(&mut self, key: PairKey, scope: Scope) -> TournamentResult<()>;

    /// Fetch a player in scope, locking it for the rest of the transaction
    async fn fetch_player(
        &mut self,
        id: PlayerId,
        scope: Scope,
    ) -> TournamentResult<Option<Player>>;

    /// Whether the unordered pair already has a match recorded in scope
    async fn fetch_match_exists(&mut self, key: PairKey, scope: Scope) -> TournamentResult<bool>;

    /// Append a match to the ledger
    async fn insert_match(&mut self, report: &MatchReport) -> TournamentResult<MatchId>;

    /// Add to a player's win and match counters
    async fn update_player_counters(
        &mut self,
        id: PlayerId,
        wins_delta: i32,
        matches_delta: i32,
    ) -> TournamentResult<()>;

    async fn commit(self: Box<Self>) -> TournamentResult<()>;

    async fn rollback(self: Box<Self>) -> TournamentResult<()>;
}

/// Default PostgreSQL implementation of `TournamentRepository`
#[derive(Clone)]
pub struct PgTournamentRepository {
    pool: PgPool,
}

impl PgTournamentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn player_from_row(row: &PgRow) -> Player {
    Player {
        id: row.get("id"),
        name: row.get("name"),
        scope: Scope::from(row.get::<Option<i64>, _>("tournament_id")),
        wins: row.get::<i32, _>("wins") as u32,
        matches: row.get::<i32, _>("matches") as u32,
    }
}

#[async_trait]
impl TournamentRepository for PgTournamentRepository {
    async fn create_player(&self, name: &str, scope: Scope) -> TournamentResult<PlayerId> {
        let row = with_default_timeout(
            sqlx::query("INSERT INTO players (name, tournament_id) VALUES ($1, $2) RETURNING id")
                .bind(name)
                .bind(scope.tournament_id())
                .fetch_one(&self.pool),
        )
        .await?;

        Ok(row.get("id"))
    }

    async fn delete_all_players(&self) -> TournamentResult<u64> {
        let result = with_long_timeout(sqlx::query("DELETE FROM players").execute(&self.pool))
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_all_matches(&self, scope: Scope) -> TournamentResult<u64> {
        let mut tx = with_default_timeout(self.pool.begin()).await?;

        let deleted = with_long_timeout(
            sqlx::query("DELETE FROM matches WHERE tournament_id IS NOT DISTINCT FROM $1")
                .bind(scope.tournament_id())
                .execute(&mut *tx),
        )
        .await?;

        with_long_timeout(
            sqlx::query(
                r#"
                UPDATE players SET wins = 0, matches = 0
                WHERE tournament_id IS NOT DISTINCT FROM $1
                "#,
            )
            .bind(scope.tournament_id())
            .execute(&mut *tx),
        )
        .await?;

        with_default_timeout(tx.commit()).await?;
        Ok(deleted.rows_affected())
    }

    async fn count_players(&self, scope: Option<Scope>) -> TournamentResult<u64> {
        let query = match scope {
            Some(scope) => sqlx::query(
                "SELECT COUNT(*) AS count FROM players WHERE tournament_id IS NOT DISTINCT FROM $1",
            )
            .bind(scope.tournament_id()),
            None => sqlx::query("SELECT COUNT(*) AS count FROM players"),
        };

        let row = with_default_timeout(query.fetch_one(&self.pool)).await?;
        Ok(row.get::<i64, _>("count") as u64)
    }

    async fn fetch_players(&self, scope: Scope) -> TournamentResult<Vec<Player>> {
        let rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, name, tournament_id, wins, matches
                FROM players
                WHERE tournament_id IS NOT DISTINCT FROM $1
                ORDER BY wins DESC, id
                "#,
            )
            .bind(scope.tournament_id())
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.iter().map(player_from_row).collect())
    }

    async fn fetch_matches(&self, scope: Scope) -> TournamentResult<Vec<MatchRecord>> {
        let rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, winner_id, loser_id, draw, tournament_id, recorded_at
                FROM matches
                WHERE tournament_id IS NOT DISTINCT FROM $1
                ORDER BY id
                "#,
            )
            .bind(scope.tournament_id())
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MatchRecord {
                id: row.get("id"),
                winner_id: row.get("winner_id"),
                loser_id: row.get("loser_id"),
                draw: row.get("draw"),
                scope: Scope::from(row.get::<Option<i64>, _>("tournament_id")),
                recorded_at: row
                    .get::<chrono::NaiveDateTime, _>("recorded_at")
                    .and_utc(),
            })
            .collect())
    }

    async fn begin(&self) -> TournamentResult<Box<dyn LedgerTransaction>> {
        let tx = with_default_timeout(self.pool.begin()).await?;
        Ok(Box::new(PgLedgerTransaction { tx }))
    }
}

/// PostgreSQL ledger transaction
pub struct PgLedgerTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTransaction for PgLedgerTransaction {
    async fn lock_pair(&mut self, key: PairKey, scope: Scope) -> TournamentResult<()> {
        with_default_timeout(
            sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
                .bind(key.lock_key(scope))
                .execute(&mut *self.tx),
        )
        .await?;
        Ok(())
    }

    async fn fetch_player(
        &mut self,
        id: PlayerId,
        scope: Scope,
    ) -> TournamentResult<Option<Player>> {
        let row = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, name, tournament_id, wins, matches
                FROM players
                WHERE id = $1 AND tournament_id IS NOT DISTINCT FROM $2
                FOR UPDATE
                "#,
            )
            .bind(id)
            .bind(scope.tournament_id())
            .fetch_optional(&mut *self.tx),
        )
        .await?;

        Ok(row.as_ref().map(player_from_row))
    }

    async fn fetch_match_exists(&mut self, key: PairKey, scope: Scope) -> TournamentResult<bool> {
        let row = with_default_timeout(
            sqlx::query(
                r#"
                SELECT EXISTS (
                    SELECT 1 FROM matches
                    WHERE ((winner_id = $1 AND loser_id = $2) OR (winner_id = $2 AND loser_id = $1))
                      AND tournament_id IS NOT DISTINCT FROM $3
                ) AS found
                "#,
            )
            .bind(key.low())
            .bind(key.high())
            .bind(scope.tournament_id())
            .fetch_one(&mut *self.tx),
        )
        .await?;

        Ok(row.get("found"))
    }

    async fn insert_match(&mut self, report: &MatchReport) -> TournamentResult<MatchId> {
        let row = with_default_timeout(
            sqlx::query(
                r#"
                INSERT INTO matches (winner_id, loser_id, draw, tournament_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(report.winner_id)
            .bind(report.loser_id)
            .bind(report.draw)
            .bind(report.scope.tournament_id())
            .fetch_one(&mut *self.tx),
        )
        .await?;

        Ok(row.get("id"))
    }

    async fn update_player_counters(
        &mut self,
        id: PlayerId,
        wins_delta: i32,
        matches_delta: i32,
    ) -> TournamentResult<()> {
        let result = with_default_timeout(
            sqlx::query("UPDATE players SET wins = wins + $1, matches = matches + $2 WHERE id = $3")
                .bind(wins_delta)
                .bind(matches_delta)
                .bind(id)
                .execute(&mut *self.tx),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(TournamentError::NotFound(id));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> TournamentResult<()> {
        let PgLedgerTransaction { tx } = *self;
        with_default_timeout(tx.commit()).await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> TournamentResult<()> {
        let PgLedgerTransaction { tx } = *self;
        with_default_timeout(tx.rollback()).await?;
        Ok(())
    }
}
