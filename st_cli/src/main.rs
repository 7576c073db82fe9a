//! Swiss-system tournament driver.
//!
//! Each invocation runs one command against the PostgreSQL store, except
//! `simulate`, which plays whole rounds against an in-memory store.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Error;
use pico_args::Arguments;
use st_cli::commands::{self, Command};
use st_cli::config::CliConfig;
use st_cli::{logging, simulation};
use swiss_tournament::db::Database;
use swiss_tournament::tournament::TournamentManager;
use tracing::info;

const HELP: &str = "\
Run a Swiss-system tournament

USAGE:
  st_cli [OPTIONS] <COMMAND>

OPTIONS:
  --db-url       URL      Database connection string  [default: env DATABASE_URL]
  --tournament   ID       Tournament tag to operate on [default: env TOURNAMENT_ID or ungrouped]
  --json                  Print results as JSON

COMMANDS:
  migrate                 Create or upgrade the database schema
  register <NAME>         Register a player
  count                   Count registered players
  standings               Show players ordered by wins
  pairings                Pair players adjacent in the standings for the next round
  report <WINNER> <LOSER> [--draw]
                          Record a match result
  history                 List recorded matches
  clear-matches           Delete matches and reset results
  clear-players           Delete all players and their matches
  simulate [--players N] [--rounds R] [--seed S]
                          Play random rounds against an in-memory store

FLAGS:
  -h, --help              Print help information

ENVIRONMENT:
  DATABASE_URL            PostgreSQL connection string
  TOURNAMENT_ID           Default tournament tag
  RUST_LOG                Log filter (default: info,sqlx=warn)
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;
    let tournament: Option<i64> = pargs.opt_value_from_str("--tournament")?;
    let json = pargs.contains("--json");
    let command = Command::parse(&mut pargs)?;

    logging::init();

    let config = CliConfig::from_env(database_url, tournament, json)?;
    config.validate_scope()?;

    if let Command::Simulate(options) = command {
        let summary = simulation::run(options).await?;
        println!("{}", commands::render_simulation(&summary, config.output)?);
        return Ok(());
    }

    config.validate_database()?;

    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

    let started = Instant::now();
    if command == Command::Migrate {
        db.migrate().await?;
        info!("Database schema is up to date");
    } else {
        let manager = TournamentManager::new(Arc::new(db.repository()));
        let output = commands::execute(&command, &manager, config.scope, config.output).await?;
        println!("{output}");
    }
    logging::log_command(command.name(), started.elapsed().as_millis() as u64);

    db.close().await;
    Ok(())
}
