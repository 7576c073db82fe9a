//! Command-line driver for Swiss-system tournaments.
//!
//! Thin layer over [`swiss_tournament::TournamentManager`]: argument parsing,
//! configuration, logging and output rendering.

pub mod commands;
pub mod config;
pub mod logging;
pub mod simulation;
