//! # Swiss Tournament
//!
//! Swiss-system tournament management: player registration, standings,
//! next-round pairings and match reporting.
//!
//! Each round the caller reads the standings, asks for pairings of players
//! adjacent in them, and reports the results back. The match ledger refuses
//! to record a pair that already met in the same scope, so a proposed
//! rematch fails at report time.
//!
//! ## Core Modules
//!
//! - [`tournament`]: Standings, pairings, match ledger and the manager facade
//! - [`db`]: PostgreSQL pool, migrations and the storage repositories
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use swiss_tournament::db::InMemoryTournamentRepository;
//! use swiss_tournament::tournament::{Scope, TournamentManager};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), swiss_tournament::TournamentError> {
//! let manager = TournamentManager::new(Arc::new(InMemoryTournamentRepository::new()));
//! manager.register_player("Ada", Scope::Ungrouped).await?;
//! manager.register_player("Grace", Scope::Ungrouped).await?;
//!
//! let pairings = manager.swiss_pairings(Scope::Ungrouped).await?;
//! assert_eq!(pairings.len(), 1);
//! # Ok(())
//! # }
//! ```

/// Database access and storage repositories.
pub mod db;

/// Standings, pairing and match ledger.
pub mod tournament;
pub use tournament::{
    MatchReport, Pairing, Scope, Standing, TournamentError, TournamentManager, TournamentResult,
};
