//! Read and inspect a persisted match.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use game_core::GameState;

use crate::dirs::GameSource;

/// Read and inspect a persisted match
#[derive(Parser)]
pub struct ReadState {
    #[command(flatten)]
    source: GameSource,

    /// Output format
    #[arg(long, value_enum, default_value = "summary")]
    format: OutputFormat,

    /// Show the projection seen by this player instead of the full state
    /// (JSON only)
    #[arg(long, value_name = "PLAYER_ID")]
    player: Option<String>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Summary view (teams, board, turn info)
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

impl ReadState {
    pub fn execute(self) -> Result<()> {
        let (state, path) = self.source.load()?;

        if let Some(player) = &self.player {
            let projection = state.get_data_for_player(player);
            return print_json(&projection);
        }

        println!("{} {}", style("Match File:").bold().cyan(), path.display());
        println!();

        match self.format {
            OutputFormat::Summary => print_summary(&state),
            OutputFormat::Json => print_json(&state)?,
            OutputFormat::Debug => println!("{state:#?}"),
        }
        Ok(())
    }
}

fn print_summary(state: &GameState) {
    println!("{}", style("=== Match Summary ===").bold().green());
    println!();

    println!("{}", style("Match:").bold().yellow());
    println!("  Id: {}", state.id);
    println!("  Ruleset: {}", state.ruleset);
    println!("  Phase: {}", state.phase());
    println!("  Board: {}x{}", state.board.width(), state.board.height());
    if let Some(undo_mode) = state.undo_mode {
        println!("  Undo: {undo_mode}");
    }
    if let Some(origin) = &state.forked_from {
        println!("  Forked from: {} at turn {}", origin.game_id, origin.turn_id);
    }
    if let Some(winner) = state.winner {
        println!("  Winner: {winner:?}");
    }
    println!();

    println!("{}", style("Teams:").bold().yellow());
    for (slot, team) in state.teams.iter().enumerate() {
        match team {
            Some(team) => println!(
                "  Team {} ({}, player {}) {:?}, {} draws{}",
                team.id,
                team.name,
                team.player_id,
                team.position,
                team.random_state.count(),
                if team.id == state.current_team_id && !state.is_ended() {
                    " <- to play"
                } else {
                    ""
                }
            ),
            None => println!("  Slot {slot}: open"),
        }
    }
    println!();

    println!("{}", style("Turns:").bold().yellow());
    println!("  Sealed: {}", state.turns.len());
    println!("  In progress: {} actions", state.actions.len());
    if let Some(deadline) = state.get_turn_time_limit(state.current_turn_id()) {
        println!("  Deadline: {}", deadline.to_rfc3339());
    }
    println!();

    println!("{}", style("Units:").bold().yellow());
    for unit in state.board.units() {
        println!(
            "  #{} {:?} (team {}) at {} facing {:?}, HP {}/{}{}",
            unit.id,
            unit.kind,
            unit.team,
            unit.position,
            unit.direction,
            unit.current_health(),
            unit.health(),
            if unit.is_dead() { " [dead]" } else { "" }
        );
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
    println!("{json}");
    Ok(())
}
