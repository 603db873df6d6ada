//! Undo planning and execution.
//!
//! Undo always restores a recorded board snapshot. Random streams live on the
//! teams, outside the snapshot, so draws consumed by undone actions stay
//! consumed and a resubmitted action draws the next value.

use chrono::{DateTime, Utc};

use crate::action::{Action, ActionKind};
use crate::state::{GameState, Phase, TeamId, UndoMode};

use super::{GameEngine, UndoError};

/// Answer to "may `team` undo right now?".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UndoPermission {
    Allowed,
    NeedsApproval,
    Denied,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UndoTarget {
    /// Discard the requester's own in-progress actions.
    InProgress,
    /// Re-open sealed turn at this index, dropping everything after it.
    Sealed(usize),
}

#[derive(Clone, Copy, Debug)]
struct UndoPlan {
    target: UndoTarget,
    needs_approval: bool,
}

fn surrendered(actions: &[Action]) -> bool {
    actions
        .iter()
        .any(|action| action.kind == ActionKind::Surrender)
}

fn plan_undo(state: &GameState, team: TeamId) -> Result<UndoPlan, UndoError> {
    if state.phase() != Phase::Active {
        return Err(UndoError::GameNotActive);
    }
    let mode = state.undo_mode.ok_or(UndoError::Disabled)?;
    if state.team(team).is_none() {
        return Err(UndoError::NothingToUndo);
    }
    if surrendered(&state.actions) {
        return Err(UndoError::Irreversible);
    }

    if team == state.current_team_id && !state.actions.is_empty() {
        let lucky = state.actions.iter().any(|action| action.has_luck());
        return Ok(UndoPlan {
            target: UndoTarget::InProgress,
            needs_approval: mode == UndoMode::Strict && lucky,
        });
    }

    match mode {
        UndoMode::Strict => {
            let last = state.turns.last().ok_or(UndoError::NothingToUndo)?;
            if last.team_id != team {
                return Err(UndoError::NotRequestersTurn);
            }
            if !state.actions.is_empty() {
                return Err(UndoError::OpponentActed);
            }
            if surrendered(&last.actions) {
                return Err(UndoError::Irreversible);
            }
            Ok(UndoPlan {
                target: UndoTarget::Sealed(last.id),
                needs_approval: true,
            })
        }
        UndoMode::Loose => {
            let index = state
                .turns
                .iter()
                .rposition(|turn| turn.team_id == team)
                .ok_or(UndoError::NothingToUndo)?;
            if state.turns[index..]
                .iter()
                .any(|turn| surrendered(&turn.actions))
            {
                return Err(UndoError::Irreversible);
            }
            Ok(UndoPlan {
                target: UndoTarget::Sealed(index),
                needs_approval: false,
            })
        }
    }
}

impl GameState {
    /// Whether `team` may undo now, and whether approval is needed.
    pub fn can_undo(&self, team: TeamId) -> UndoPermission {
        match plan_undo(self, team) {
            Ok(plan) if plan.needs_approval => UndoPermission::NeedsApproval,
            Ok(_) => UndoPermission::Allowed,
            Err(_) => UndoPermission::Denied,
        }
    }
}

impl<'a> GameEngine<'a> {
    /// Undoes on behalf of `team` (defaults to the current team).
    ///
    /// `approved` carries the opposing team's consent where strict mode
    /// requires it.
    pub fn undo(
        &mut self,
        team: Option<TeamId>,
        approved: bool,
        now: DateTime<Utc>,
    ) -> Result<(), UndoError> {
        let team = team.unwrap_or(self.state.current_team_id);
        let plan = plan_undo(self.state, team)?;
        if plan.needs_approval && !approved {
            return Err(UndoError::ApprovalRequired);
        }

        match plan.target {
            UndoTarget::InProgress => {
                let snapshot = self.state.turn_units.clone();
                self.state.board.restore(snapshot)?;
            }
            UndoTarget::Sealed(index) => {
                let reopened = self.state.turns[index].clone();
                self.state.board.restore(reopened.units.clone())?;
                self.state.turns.truncate(index);
                self.state.turn_units = reopened.units;
                self.state.current_team_id = reopened.team_id;
            }
        }
        self.state.actions.clear();
        self.state.turn_started_at = Some(now);
        Ok(())
    }
}
