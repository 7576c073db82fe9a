//! In-memory implementation of the tournament repository.
//!
//! Used by tests and by round simulations that don't need persistence. A
//! ledger transaction holds the store's lock for its whole lifetime and works
//! on a staged copy, so reports are serialized and either fully applied on
//! commit or discarded.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::repository::{LedgerTransaction, TournamentRepository};
use crate::tournament::{
    MatchId, MatchRecord, MatchReport, PairKey, Player, PlayerId, Scope, TournamentError,
    TournamentResult,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    players: BTreeMap<PlayerId, Player>,
    matches: Vec<MatchRecord>,
    next_player_id: PlayerId,
    next_match_id: MatchId,
}

impl MemoryState {
    fn pair_recorded(&self, key: PairKey, scope: Scope) -> bool {
        self.matches
            .iter()
            .any(|m| m.scope == scope && m.key() == key)
    }
}

/// Repository keeping players and matches in process memory
#[derive(Clone, Default)]
pub struct InMemoryTournamentRepository {
    state: Arc<Mutex<MemoryState>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryTournamentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the store were unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> TournamentResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(TournamentError::Connection(
                "in-memory store is offline".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TournamentRepository for InMemoryTournamentRepository {
    async fn create_player(&self, name: &str, scope: Scope) -> TournamentResult<PlayerId> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        state.next_player_id += 1;
        let id = state.next_player_id;
        state.players.insert(id, Player::new(id, name, scope));
        Ok(id)
    }

    async fn delete_all_players(&self) -> TournamentResult<u64> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let deleted = state.players.len() as u64;
        state.players.clear();
        state.matches.clear();
        Ok(deleted)
    }

    async fn delete_all_matches(&self, scope: Scope) -> TournamentResult<u64> {
        self.check_online()?;
        let mut state = self.state.lock().await;
        let before = state.matches.len();
        state.matches.retain(|m| m.scope != scope);
        let deleted = (before - state.matches.len()) as u64;

        for player in state.players.values_mut().filter(|p| p.scope == scope) {
            player.wins = 0;
            player.matches = 0;
        }
        Ok(deleted)
    }

    async fn count_players(&self, scope: Option<Scope>) -> TournamentResult<u64> {
        self.check_online()?;
        let state = self.state.lock().await;
        let count = match scope {
            Some(scope) => state.players.values().filter(|p| p.scope == scope).count(),
            None => state.players.len(),
        };
        Ok(count as u64)
    }

    async fn fetch_players(&self, scope: Scope) -> TournamentResult<Vec<Player>> {
        self.check_online()?;
        let state = self.state.lock().await;
        Ok(state
            .players
            .values()
            .filter(|p| p.scope == scope)
            .cloned()
            .collect())
    }

    async fn fetch_matches(&self, scope: Scope) -> TournamentResult<Vec<MatchRecord>> {
        self.check_online()?;
        let state = self.state.lock().await;
        Ok(state
            .matches
            .iter()
            .filter(|m| m.scope == scope)
            .cloned()
            .collect())
    }

    async fn begin(&self) -> TournamentResult<Box<dyn LedgerTransaction>> {
        self.check_online()?;
        let guard = self.state.clone().lock_owned().await;
        let staged = (*guard).clone();
        Ok(Box::new(MemoryLedgerTransaction { guard, staged }))
    }
}

/// Ledger transaction over the in-memory store
pub struct MemoryLedgerTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl LedgerTransaction for MemoryLedgerTransaction {
    async fn lock_pair(&mut self, _key: PairKey, _scope: Scope) -> TournamentResult<()> {
        // The store lock is already held exclusively
        Ok(())
    }

    async fn fetch_player(
        &mut self,
        id: PlayerId,
        scope: Scope,
    ) -> TournamentResult<Option<Player>> {
        Ok(self
            .staged
            .players
            .get(&id)
            .filter(|p| p.scope == scope)
            .cloned())
    }

    async fn fetch_match_exists(&mut self, key: PairKey, scope: Scope) -> TournamentResult<bool> {
        Ok(self.staged.pair_recorded(key, scope))
    }

    async fn insert_match(&mut self, report: &MatchReport) -> TournamentResult<MatchId> {
        if self.staged.pair_recorded(report.key(), report.scope) {
            return Err(TournamentError::DuplicatePairing {
                first: report.winner_id,
                second: report.loser_id,
            });
        }

        self.staged.next_match_id += 1;
        let id = self.staged.next_match_id;
        self.staged.matches.push(MatchRecord {
            id,
            winner_id: report.winner_id,
            loser_id: report.loser_id,
            draw: report.draw,
            scope: report.scope,
            recorded_at: chrono::Utc::now(),
        });
        Ok(id)
    }

    async fn update_player_counters(
        &mut self,
        id: PlayerId,
        wins_delta: i32,
        matches_delta: i32,
    ) -> TournamentResult<()> {
        let player = self
            .staged
            .players
            .get_mut(&id)
            .ok_or(TournamentError::NotFound(id))?;
        player.wins = player.wins.saturating_add_signed(wins_delta);
        player.matches = player.matches.saturating_add_signed(matches_delta);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> TournamentResult<()> {
        let MemoryLedgerTransaction { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> TournamentResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_player_assigns_sequential_ids() {
        let repo = InMemoryTournamentRepository::new();

        let first = repo.create_player("Ada", Scope::Ungrouped).await.unwrap();
        let second = repo.create_player("Grace", Scope::Ungrouped).await.unwrap();

        assert_eq!(first, 1, "First player should have ID 1");
        assert_eq!(second, 2, "Second player should have ID 2");
        assert_eq!(repo.count_players(None).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fetch_players_respects_scope() {
        let repo = InMemoryTournamentRepository::new();
        repo.create_player("Ada", Scope::Ungrouped).await.unwrap();
        repo.create_player("Grace", Scope::Tournament(1)).await.unwrap();
        repo.create_player("Linus", Scope::Tournament(1)).await.unwrap();

        assert_eq!(repo.fetch_players(Scope::Ungrouped).await.unwrap().len(), 1);
        assert_eq!(repo.fetch_players(Scope::Tournament(1)).await.unwrap().len(), 2);
        assert!(repo.fetch_players(Scope::Tournament(2)).await.unwrap().is_empty());
        assert_eq!(repo.count_players(Some(Scope::Tournament(1))).await.unwrap(), 2);
        assert_eq!(repo.count_players(None).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_uncommitted_transaction_is_discarded() {
        let repo = InMemoryTournamentRepository::new();
        let a = repo.create_player("Ada", Scope::Ungrouped).await.unwrap();
        let b = repo.create_player("Grace", Scope::Ungrouped).await.unwrap();

        let mut tx = repo.begin().await.unwrap();
        tx.insert_match(&MatchReport::win(a, b)).await.unwrap();
        tx.update_player_counters(a, 1, 1).await.unwrap();
        drop(tx);

        assert!(repo.fetch_matches(Scope::Ungrouped).await.unwrap().is_empty());
        let players = repo.fetch_players(Scope::Ungrouped).await.unwrap();
        assert!(players.iter().all(|p| p.wins == 0 && p.matches == 0));
    }

    #[tokio::test]
    async fn test_committed_transaction_is_visible() {
        let repo = InMemoryTournamentRepository::new();
        let a = repo.create_player("Ada", Scope::Ungrouped).await.unwrap();
        let b = repo.create_player("Grace", Scope::Ungrouped).await.unwrap();

        let mut tx = repo.begin().await.unwrap();
        let match_id = tx.insert_match(&MatchReport::win(a, b)).await.unwrap();
        tx.update_player_counters(a, 1, 1).await.unwrap();
        tx.update_player_counters(b, 0, 1).await.unwrap();
        tx.commit().await.unwrap();

        let matches = repo.fetch_matches(Scope::Ungrouped).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, match_id);
        assert_eq!(matches[0].key(), PairKey::new(b, a));
    }

    #[tokio::test]
    async fn test_insert_rejects_recorded_pair() {
        let repo = InMemoryTournamentRepository::new();
        let a = repo.create_player("Ada", Scope::Ungrouped).await.unwrap();
        let b = repo.create_player("Grace", Scope::Ungrouped).await.unwrap();

        let mut tx = repo.begin().await.unwrap();
        tx.insert_match(&MatchReport::win(a, b)).await.unwrap();
        let err = tx.insert_match(&MatchReport::win(b, a)).await.unwrap_err();
        assert!(matches!(err, TournamentError::DuplicatePairing { .. }));
    }

    #[tokio::test]
    async fn test_delete_all_matches_resets_scope_only() {
        let repo = InMemoryTournamentRepository::new();
        let a = repo.create_player("Ada", Scope::Tournament(1)).await.unwrap();
        let b = repo.create_player("Grace", Scope::Tournament(1)).await.unwrap();
        let c = repo.create_player("Linus", Scope::Tournament(2)).await.unwrap();
        let d = repo.create_player("Ken", Scope::Tournament(2)).await.unwrap();

        for (w, l, t) in [(a, b, 1), (c, d, 2)] {
            let mut tx = repo.begin().await.unwrap();
            tx.insert_match(&MatchReport::win(w, l).in_scope(Scope::Tournament(t)))
                .await
                .unwrap();
            tx.update_player_counters(w, 1, 1).await.unwrap();
            tx.update_player_counters(l, 0, 1).await.unwrap();
            tx.commit().await.unwrap();
        }

        assert_eq!(repo.delete_all_matches(Scope::Tournament(1)).await.unwrap(), 1);

        let first = repo.fetch_players(Scope::Tournament(1)).await.unwrap();
        assert!(first.iter().all(|p| p.wins == 0 && p.matches == 0));
        let second = repo.fetch_players(Scope::Tournament(2)).await.unwrap();
        assert_eq!(second.iter().map(|p| p.matches).sum::<u32>(), 2);
        assert_eq!(repo.fetch_matches(Scope::Tournament(2)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_offline_store_reports_connection_error() {
        let repo = InMemoryTournamentRepository::new();
        repo.set_offline(true);

        let err = repo.create_player("Ada", Scope::Ungrouped).await.unwrap_err();
        assert!(matches!(err, TournamentError::Connection(_)));
        assert!(repo.begin().await.is_err());

        repo.set_offline(false);
        assert!(repo.create_player("Ada", Scope::Ungrouped).await.is_ok());
    }
}
