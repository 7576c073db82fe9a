//! Standings ranking.

use super::models::{Player, Standing};
use std::cmp::Reverse;

/// Rank players by wins, most first, breaking ties by ascending player ID.
///
/// The ordering is total, so ranking the same players twice always yields
/// the same sequence regardless of the order the store returned them in.
pub fn rank(players: Vec<Player>) -> Vec<Standing> {
    let mut standings: Vec<Standing> = players.into_iter().map(Standing::from).collect();
    standings.sort_unstable_by_key(|s| (Reverse(s.wins), s.id));
    standings
}
