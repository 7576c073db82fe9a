//! Swiss-system tournament core.
//!
//! This module provides:
//! - Player registration, optionally grouped by a tournament tag
//! - Standings ordered by wins with a deterministic tiebreak
//! - Next-round pairings of players adjacent in the standings
//! - A match ledger that refuses to record the same pair twice
//!
//! ## Example
//!
//! ```no_run
//! use swiss_tournament::db::Database;
//! use swiss_tournament::tournament::{MatchReport, Scope, TournamentManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let manager = TournamentManager::new(Arc::new(db.repository()));
//!
//!     let ada = manager.register_player("Ada", Scope::Ungrouped).await?;
//!     let grace = manager.register_player("Grace", Scope::Ungrouped).await?;
//!
//!     for pairing in manager.swiss_pairings(Scope::Ungrouped).await? {
//!         println!("{} vs {}", pairing.name1, pairing.name2);
//!     }
//!
//!     manager.report_match(MatchReport::win(ada, grace)).await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ledger;
pub mod manager;
pub mod models;
pub mod pairing;
pub mod standings;

pub use errors::{TournamentError, TournamentResult};
pub use ledger::MatchLedger;
pub use manager::TournamentManager;
pub use models::{
    MatchId, MatchRecord, MatchReport, PairKey, Pairing, Player, PlayerId, Scope, Standing,
    TournamentId,
};
