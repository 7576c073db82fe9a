//! Next-round pairing generation.

use super::errors::{TournamentError, TournamentResult};
use super::models::{Pairing, Standing};

/// Pair consecutive standings rows: (0, 1), (2, 3), (4, 5), ...
///
/// Players with equal or nearest win records end up together. Rematches are
/// not filtered here; the match ledger rejects them when reported.
///
/// # Errors
///
/// * `TournamentError::OddPlayerCount` - one player would be left unpaired
pub fn pair_adjacent(standings: &[Standing]) -> TournamentResult<Vec<Pairing>> {
    if standings.len() % 2 != 0 {
        return Err(TournamentError::OddPlayerCount(standings.len()));
    }

    Ok(standings
        .chunks_exact(2)
        .map(|pair| Pairing::between(&pair[0], &pair[1]))
        .collect())
}
