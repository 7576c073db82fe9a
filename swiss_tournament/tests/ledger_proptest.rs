//! Property-based tests for the match ledger
//!
//! Random report sequences are replayed against the in-memory repository and
//! the aggregate counters are checked against the recorded ledger.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use swiss_tournament::db::InMemoryTournamentRepository;
use swiss_tournament::tournament::{
    MatchReport, PairKey, Scope, TournamentError, TournamentManager,
};

fn report_strategy(players: i64) -> impl Strategy<Value = (i64, i64, bool)> {
    (1..=players, 1..=players, prop::bool::weighted(0.2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_counters_match_ledger(
        reports in prop::collection::vec(report_strategy(8), 0..60),
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let mgr = TournamentManager::new(Arc::new(InMemoryTournamentRepository::new()));
            for i in 0..8 {
                mgr.register_player(&format!("P{i}"), Scope::Ungrouped).await.unwrap();
            }

            let mut played = HashSet::new();
            for (winner, loser, draw) in reports {
                let report = if draw {
                    MatchReport::draw(winner, loser)
                } else {
                    MatchReport::win(winner, loser)
                };
                let result = mgr.report_match(report).await;

                if winner == loser {
                    prop_assert!(matches!(result, Err(TournamentError::SamePlayer(_))));
                } else if played.insert(PairKey::new(winner, loser)) {
                    prop_assert!(result.is_ok());
                } else {
                    let is_duplicate = matches!(result, Err(TournamentError::DuplicatePairing { .. }));
                    prop_assert!(is_duplicate);
                }
            }

            let history = mgr.match_history(Scope::Ungrouped).await.unwrap();
            let standings = mgr.standings(Scope::Ungrouped).await.unwrap();

            prop_assert_eq!(history.len(), played.len());
            let keys: HashSet<_> = history.iter().map(|m| m.key()).collect();
            prop_assert_eq!(keys.len(), history.len());

            for s in &standings {
                let wins = history.iter().filter(|m| !m.draw && m.winner_id == s.id).count();
                let matches = history
                    .iter()
                    .filter(|m| m.winner_id == s.id || m.loser_id == s.id)
                    .count();
                prop_assert_eq!(s.wins as usize, wins);
                prop_assert_eq!(s.matches as usize, matches);
                prop_assert!(s.wins <= s.matches);
            }
            Ok(())
        })?;
    }
}
