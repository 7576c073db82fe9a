//! Round-by-round tournament simulation against the in-memory store.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use swiss_tournament::db::InMemoryTournamentRepository;
use swiss_tournament::tournament::{
    MatchReport, Scope, Standing, TournamentError, TournamentManager, TournamentResult,
};
use tracing::{info, warn};

/// Chance that a simulated match ends drawn
const DRAW_PROBABILITY: f64 = 0.1;

/// Simulation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationOptions {
    pub players: usize,
    pub rounds: usize,
    /// Random seed; a fresh one is drawn when absent
    pub seed: Option<u64>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            players: 8,
            rounds: 3,
            seed: None,
        }
    }
}

/// Outcome of a simulation run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub rounds_played: usize,
    pub matches_recorded: usize,
    pub rematches_skipped: usize,
    pub standings: Vec<Standing>,
}

/// Run the register, pair, report loop with random results
///
/// Pairings that repeat an earlier match are rejected by the ledger; they are
/// logged and skipped, and both players sit the round out.
///
/// # Errors
///
/// * `TournamentError::OddPlayerCount` - `players` is odd
pub async fn run(options: SimulationOptions) -> TournamentResult<SimulationSummary> {
    let seed = options.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let manager = TournamentManager::new(Arc::new(InMemoryTournamentRepository::new()));
    let scope = Scope::Ungrouped;

    for i in 1..=options.players {
        manager.register_player(&format!("Player {i}"), scope).await?;
    }

    let mut matches_recorded = 0;
    let mut rematches_skipped = 0;

    for round in 1..=options.rounds {
        let pairings = manager.swiss_pairings(scope).await?;
        info!("Round {}: {} pairings", round, pairings.len());

        for pairing in pairings {
            let report = if rng.random_bool(DRAW_PROBABILITY) {
                MatchReport::draw(pairing.id1, pairing.id2)
            } else if rng.random_bool(0.5) {
                MatchReport::win(pairing.id1, pairing.id2)
            } else {
                MatchReport::win(pairing.id2, pairing.id1)
            };

            match manager.report_match(report).await {
                Ok(_) => matches_recorded += 1,
                Err(TournamentError::DuplicatePairing { first, second }) => {
                    warn!(
                        "Round {}: {} and {} already met, skipping",
                        round, first, second
                    );
                    rematches_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok(SimulationSummary {
        seed,
        rounds_played: options.rounds,
        matches_recorded,
        rematches_skipped,
        standings: manager.standings(scope).await?,
    })
}
