//! Integration tests for command execution and rendering.
//!
//! Commands run against an in-memory repository, so no database is needed.

use std::sync::Arc;
use st_cli::commands::{Command, execute};
use st_cli::config::OutputFormat;
use swiss_tournament::db::InMemoryTournamentRepository;
use swiss_tournament::tournament::{Scope, TournamentError, TournamentManager};

fn setup_manager() -> TournamentManager {
    TournamentManager::new(Arc::new(InMemoryTournamentRepository::new()))
}

async fn run(mgr: &TournamentManager, command: Command) -> anyhow::Result<String> {
    execute(&command, mgr, Scope::Ungrouped, OutputFormat::Text).await
}

async fn register(mgr: &TournamentManager, names: &[&str]) {
    for name in names {
        run(
            mgr,
            Command::Register {
                name: name.to_string(),
            },
        )
        .await
        .unwrap();
    }
}

#[tokio::test]
async fn test_register_count_and_pair() {
    let mgr = setup_manager();
    register(&mgr, &["Ada", "Grace", "Linus", "Ken"]).await;

    let count = run(&mgr, Command::Count).await.unwrap();
    assert_eq!(count, "4 players registered, 4 in ungrouped");

    let pairings = run(&mgr, Command::Pairings).await.unwrap();
    assert_eq!(
        pairings,
        "Board 1: #1 Ada vs #2 Grace\nBoard 2: #3 Linus vs #4 Ken"
    );
}

#[tokio::test]
async fn test_report_then_rematch_fails() {
    let mgr = setup_manager();
    register(&mgr, &["Ada", "Grace"]).await;

    let report = Command::Report {
        winner: 1,
        loser: 2,
        draw: false,
    };
    assert_eq!(run(&mgr, report).await.unwrap(), "Recorded match #1");

    let rematch = Command::Report {
        winner: 2,
        loser: 1,
        draw: true,
    };
    let err = run(&mgr, rematch).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TournamentError>(),
        Some(TournamentError::DuplicatePairing { .. })
    ));

    let history = run(&mgr, Command::History).await.unwrap();
    assert_eq!(history.lines().count(), 1);
    assert!(history.contains("1 beat 2"));
}

#[tokio::test]
async fn test_json_standings() {
    let mgr = setup_manager();
    register(&mgr, &["Ada", "Grace"]).await;
    run(
        &mgr,
        Command::Report {
            winner: 2,
            loser: 1,
            draw: false,
        },
    )
    .await
    .unwrap();

    let json = execute(&Command::Standings, &mgr, Scope::Ungrouped, OutputFormat::Json)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value[0]["id"], 2);
    assert_eq!(value[0]["wins"], 1);
    assert_eq!(value[1]["name"], "Ada");
    assert_eq!(value[1]["matches"], 1);
}

#[tokio::test]
async fn test_clear_commands() {
    let mgr = setup_manager();
    register(&mgr, &["Ada", "Grace"]).await;
    run(
        &mgr,
        Command::Report {
            winner: 1,
            loser: 2,
            draw: false,
        },
    )
    .await
    .unwrap();

    assert_eq!(
        run(&mgr, Command::ClearMatches).await.unwrap(),
        "Deleted 1 matches in ungrouped"
    );
    assert_eq!(
        run(&mgr, Command::ClearPlayers).await.unwrap(),
        "Deleted 2 players"
    );
    assert_eq!(run(&mgr, Command::History).await.unwrap(), "No matches recorded");
}

#[tokio::test]
async fn test_odd_field_cannot_be_paired() {
    let mgr = setup_manager();
    register(&mgr, &["Ada", "Grace", "Linus"]).await;

    let err = run(&mgr, Command::Pairings).await.unwrap_err();
    assert!(err.to_string().contains("odd number of players"));
}

#[tokio::test]
async fn test_non_storage_commands_rejected() {
    let mgr = setup_manager();
    assert!(run(&mgr, Command::Migrate).await.is_err());
}
