//! Operator tasks for persisted tactics matches
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;

use anyhow::Result;
use clap::Parser;
use commands::{Audit, ListGames, ReadState, ReadTurns};

/// Operator tools for tactics matches
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Inspect and audit persisted tactics matches", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Re-derive every recorded luck draw and replay the turn history
    Audit(Audit),

    /// List persisted matches
    List(ListGames),

    /// Read and inspect a persisted match
    ReadState(ReadState),

    /// Print the turn history of a persisted match
    ReadTurns(ReadTurns),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for TACTICS_DATA_DIR and RUST_LOG)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Audit(cmd) => cmd.execute(),
        Command::List(cmd) => cmd.execute(),
        Command::ReadState(cmd) => cmd.execute(),
        Command::ReadTurns(cmd) => cmd.execute(),
    }
}
