//! Command parsing and execution.

use crate::config::OutputFormat;
use crate::simulation::{SimulationOptions, SimulationSummary};
use pico_args::Arguments;
use serde::Serialize;
use serde_json::json;
use swiss_tournament::tournament::{
    MatchRecord, MatchReport, Pairing, PlayerId, Scope, Standing, TournamentManager,
};

/// A single driver command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Migrate,
    Register { name: String },
    Count,
    Standings,
    Pairings,
    Report {
        winner: PlayerId,
        loser: PlayerId,
        draw: bool,
    },
    History,
    ClearMatches,
    ClearPlayers,
    Simulate(SimulationOptions),
}

/// Command-line parsing errors
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No command given (try --help)")]
    MissingCommand,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Unexpected arguments: {0:?}")]
    UnexpectedArguments(Vec<String>),

    #[error("Invalid arguments: {0}")]
    Args(#[from] pico_args::Error),
}

impl Command {
    /// Parse the subcommand and its arguments
    ///
    /// Global options must already have been taken from `args`.
    pub fn parse(args: &mut Arguments) -> Result<Self, CommandError> {
        let name = args.subcommand()?.ok_or(CommandError::MissingCommand)?;

        let command = match name.as_str() {
            "migrate" => Command::Migrate,
            "register" => Command::Register {
                name: args.free_from_str()?,
            },
            "count" => Command::Count,
            "standings" => Command::Standings,
            "pairings" => Command::Pairings,
            "report" => {
                let draw = args.contains("--draw");
                Command::Report {
                    winner: args.free_from_str()?,
                    loser: args.free_from_str()?,
                    draw,
                }
            }
            "history" => Command::History,
            "clear-matches" => Command::ClearMatches,
            "clear-players" => Command::ClearPlayers,
            "simulate" => {
                let defaults = SimulationOptions::default();
                Command::Simulate(SimulationOptions {
                    players: args
                        .opt_value_from_str("--players")?
                        .unwrap_or(defaults.players),
                    rounds: args
                        .opt_value_from_str("--rounds")?
                        .unwrap_or(defaults.rounds),
                    seed: args.opt_value_from_str("--seed")?,
                })
            }
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };

        let rest = args.clone().finish();
        if !rest.is_empty() {
            return Err(CommandError::UnexpectedArguments(
                rest.into_iter()
                    .map(|arg| arg.to_string_lossy().into_owned())
                    .collect(),
            ));
        }

        Ok(command)
    }

    /// Name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Migrate => "migrate",
            Command::Register { .. } => "register",
            Command::Count => "count",
            Command::Standings => "standings",
            Command::Pairings => "pairings",
            Command::Report { .. } => "report",
            Command::History => "history",
            Command::ClearMatches => "clear-matches",
            Command::ClearPlayers => "clear-players",
            Command::Simulate(_) => "simulate",
        }
    }
}

/// Run a storage-backed command and render its result
///
/// `migrate` and `simulate` don't go through the manager and are handled by
/// the caller.
pub async fn execute(
    command: &Command,
    manager: &TournamentManager,
    scope: Scope,
    output: OutputFormat,
) -> anyhow::Result<String> {
    let rendered = match command {
        Command::Register { name } => {
            let id = manager.register_player(name, scope).await?;
            match output {
                OutputFormat::Json => to_json(&json!({ "id": id }))?,
                OutputFormat::Text => format!("Registered player #{id} ({scope})"),
            }
        }
        Command::Count => {
            let total = manager.count_players().await?;
            let in_scope = manager.count_players_in(scope).await?;
            match output {
                OutputFormat::Json => to_json(&json!({ "total": total, "in_scope": in_scope }))?,
                OutputFormat::Text => format!("{total} players registered, {in_scope} in {scope}"),
            }
        }
        Command::Standings => {
            let standings = manager.standings(scope).await?;
            match output {
                OutputFormat::Json => to_json(&standings)?,
                OutputFormat::Text => render_standings(&standings),
            }
        }
        Command::Pairings => {
            let pairings = manager.swiss_pairings(scope).await?;
            match output {
                OutputFormat::Json => to_json(&pairings)?,
                OutputFormat::Text => render_pairings(&pairings),
            }
        }
        Command::Report {
            winner,
            loser,
            draw,
        } => {
            let report = if *draw {
                MatchReport::draw(*winner, *loser)
            } else {
                MatchReport::win(*winner, *loser)
            };
            let id = manager.report_match(report.in_scope(scope)).await?;
            match output {
                OutputFormat::Json => to_json(&json!({ "match_id": id }))?,
                OutputFormat::Text => format!("Recorded match #{id}"),
            }
        }
        Command::History => {
            let history = manager.match_history(scope).await?;
            match output {
                OutputFormat::Json => to_json(&history)?,
                OutputFormat::Text => render_history(&history),
            }
        }
        Command::ClearMatches => {
            let deleted = manager.delete_matches(scope).await?;
            match output {
                OutputFormat::Json => to_json(&json!({ "deleted_matches": deleted }))?,
                OutputFormat::Text => format!("Deleted {deleted} matches in {scope}"),
            }
        }
        Command::ClearPlayers => {
            let deleted = manager.delete_players().await?;
            match output {
                OutputFormat::Json => to_json(&json!({ "deleted_players": deleted }))?,
                OutputFormat::Text => format!("Deleted {deleted} players"),
            }
        }
        Command::Migrate | Command::Simulate(_) => {
            anyhow::bail!("{} is not a storage command", command.name())
        }
    };

    Ok(rendered)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Render standings as an aligned table
pub fn render_standings(standings: &[Standing]) -> String {
    let mut out = format!("{:>4}  {:<24} {:>4} {:>7}", "ID", "NAME", "WINS", "MATCHES");
    for s in standings {
        out.push_str(&format!(
            "\n{:>4}  {:<24} {:>4} {:>7}",
            s.id, s.name, s.wins, s.matches
        ));
    }
    out
}

/// Render one line per pairing
pub fn render_pairings(pairings: &[Pairing]) -> String {
    if pairings.is_empty() {
        return "No players to pair".to_string();
    }
    pairings
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "Board {}: #{} {} vs #{} {}",
                i + 1,
                p.id1,
                p.name1,
                p.id2,
                p.name2
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_history(history: &[MatchRecord]) -> String {
    if history.is_empty() {
        return "No matches recorded".to_string();
    }
    history
        .iter()
        .map(|m| {
            let recorded = m.recorded_at.format("%Y-%m-%d %H:%M:%S");
            if m.draw {
                format!("#{} {}: {} drew with {}", m.id, recorded, m.winner_id, m.loser_id)
            } else {
                format!("#{} {}: {} beat {}", m.id, recorded, m.winner_id, m.loser_id)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a simulation summary
pub fn render_simulation(
    summary: &SimulationSummary,
    output: OutputFormat,
) -> anyhow::Result<String> {
    match output {
        OutputFormat::Json => to_json(summary),
        OutputFormat::Text => Ok(format!(
            "Seed {}: {} rounds, {} matches recorded, {} rematches skipped\n{}",
            summary.seed,
            summary.rounds_played,
            summary.matches_recorded,
            summary.rematches_skipped,
            render_standings(&summary.standings)
        )),
    }
}
