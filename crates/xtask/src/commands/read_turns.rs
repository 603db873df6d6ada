//! Print the turn history of a persisted match.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use game_core::{Action, GameState, TurnData};

use crate::dirs::GameSource;

/// Print recorded turns, actions and results
#[derive(Parser)]
pub struct ReadTurns {
    #[command(flatten)]
    source: GameSource,

    /// First turn to print
    #[arg(long, default_value_t = 0)]
    from: usize,

    /// Last turn to print (defaults to the turn in progress)
    #[arg(long)]
    to: Option<usize>,

    /// Output JSON instead of text
    #[arg(long)]
    json: bool,
}

impl ReadTurns {
    pub fn execute(self) -> Result<()> {
        let (state, _) = self.source.load()?;
        let last = self.to.unwrap_or_else(|| state.current_turn_id());
        let turns = collect(&state, self.from, last);

        if self.json {
            let json = serde_json::to_string_pretty(&turns).context("Failed to serialize turns")?;
            println!("{json}");
            return Ok(());
        }

        if turns.is_empty() {
            println!("No turns in range {}..={}", self.from, last);
        }
        for turn in &turns {
            print_turn(&state, turn);
        }
        Ok(())
    }
}

fn collect(state: &GameState, from: usize, to: usize) -> Vec<TurnData> {
    (from..=to)
        .map_while(|turn_id| state.get_turn_data(turn_id))
        .collect()
}

fn print_turn(state: &GameState, turn: &TurnData) {
    let sealed = turn.id < state.turns.len();
    let started = turn
        .started_at
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{} team {} at {}{}",
        style(format!("Turn {}", turn.id)).bold().yellow(),
        turn.team_id,
        started,
        if sealed { "" } else { " (in progress)" }
    );
    if turn.actions.is_empty() {
        println!("  (no actions)");
    }
    for action in &turn.actions {
        print_action(action);
    }
    println!();
}

fn print_action(action: &Action) {
    let mut line = format!("  {}", action.kind);
    if let Some(unit) = action.unit {
        line.push_str(&format!(" #{unit}"));
    }
    if let Some(target) = action.target {
        line.push_str(&format!(" -> {target}"));
    }
    if let Some(direction) = action.direction {
        line.push_str(&format!(" facing {direction:?}"));
    }
    if action.forced {
        line.push_str(" [forced]");
    }
    println!("{line}");

    for result in &action.results {
        let luck = result
            .luck
            .map(|luck| format!(" (draw #{}: {} vs {})", luck.id, luck.number, luck.chance))
            .unwrap_or_default();
        println!("    #{} {:?}{}", result.unit, result.kind, luck);
    }
}
