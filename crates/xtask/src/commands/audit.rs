//! Independent audit of a persisted match.
//!
//! Re-derives every recorded luck draw from each team's persisted starting
//! generator, then replays the turn history onto its snapshots. Stops at the
//! first integrity violation and exits with an error.

use anyhow::Result;
use clap::Parser;
use console::style;

use game_core::{AuditReport, GameError, GameState, IntegrityError, audit_game};

use crate::dirs::GameSource;

/// Audit random draws and turn history
#[derive(Parser)]
pub struct Audit {
    #[command(flatten)]
    source: GameSource,

    /// Only audit random draws; skip the history replay
    #[arg(long)]
    draws_only: bool,
}

impl Audit {
    pub fn execute(self) -> Result<()> {
        let (state, path) = self.source.load()?;
        println!("{} {}", style("Match File:").bold().cyan(), path.display());
        println!("{} {}", style("Match:").bold().cyan(), state.id);
        println!();

        match run(&state, self.draws_only) {
            Ok(reports) => {
                print_reports(&state, &reports);
                println!("{}", style("Audit passed").bold().green());
                Ok(())
            }
            Err(err) => {
                tracing::error!(game_id = %state.id, code = err.error_code(), error = %err, "audit failed");
                println!(
                    "{} [{}] {}",
                    style("INTEGRITY VIOLATION").bold().red(),
                    err.error_code(),
                    err
                );
                anyhow::bail!("audit of {} failed: {err}", state.id)
            }
        }
    }
}

fn run(state: &GameState, draws_only: bool) -> Result<Vec<AuditReport>, IntegrityError> {
    let reports = audit_game(state)?;
    if !draws_only {
        state.verify_history()?;
    }
    Ok(reports)
}

fn print_reports(state: &GameState, reports: &[AuditReport]) {
    println!("{}", style("Random streams:").bold().yellow());
    if let Some(origin) = &state.forked_from {
        println!(
            "  Forked from {} at turn {}; earlier turns skipped",
            origin.game_id, origin.turn_id
        );
    }
    for report in reports {
        let name = state
            .team(report.team)
            .map(|team| team.name.as_str())
            .unwrap_or("?");
        println!(
            "  Team {} ({}): {} draws checked, {} skipped, last #{} of {}",
            report.team,
            name,
            report.draws_checked,
            report.draws_skipped,
            report.last_draw_id,
            report.count
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use game_core::{
        ActionRequest, Direction, GameEngine, GameOptions, JoinRequest, Position, SetUnit,
        TeamSet, UnitKind,
    };

    fn played() -> GameState {
        let set = TeamSet {
            name: "duel".into(),
            units: vec![SetUnit {
                kind: UnitKind::Knight,
                position: Position::new(5, 9),
                direction: Direction::North,
            }],
        };
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut state = GameState::new("audited", GameOptions::new(2)).unwrap();
        let mut engine = GameEngine::new(&mut state);
        engine
            .join(None, JoinRequest::new("a", "A", set.clone()), 3)
            .unwrap();
        engine.join(None, JoinRequest::new("b", "B", set), 4).unwrap();
        engine.start(now, None).unwrap();
        engine.submit_action(&ActionRequest::end_turn(), now).unwrap();
        state
    }

    #[test]
    fn clean_history_passes() {
        let reports = run(&played(), false).unwrap();
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn tampered_snapshot_is_reported() {
        let mut state = played();
        state.turns[0].units[0].position = Position::new(0, 0);
        assert!(matches!(
            run(&state, false),
            Err(IntegrityError::HistoryDesync { turn_id: 0 })
        ));
        assert!(run(&state, true).is_ok());
    }
}
