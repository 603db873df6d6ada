//! Independent verification of recorded history.
//!
//! Two checks share this module:
//!
//! - **Random audit** ([`audit_team`], [`audit_game`]): re-derives every
//!   recorded luck draw from a team's persisted starting generator and
//!   compares number and outcome. Draws consumed by undone turns leave gaps
//!   in the recorded ids; the walk jumps over them, never reusing a value.
//! - **History replay** ([`GameState::verify_history`]): replays each sealed
//!   turn's results onto its opening snapshot and checks it lands on the next
//!   turn's snapshot.
//!
//! Any mismatch is an [`IntegrityError`]: fatal, reported, never corrected.

use rand_pcg::Pcg32;

use crate::action::Action;
use crate::board::{Board, BoardError};
use crate::combat::ResultKind;
use crate::error::{ErrorSeverity, GameError};
use crate::random::RandomState;
use crate::state::{GameState, TeamId};
use crate::units::Unit;

/// Determinism contract violation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntegrityError {
    #[error(
        "team {team} turn {turn_id}: draw #{luck_id} recorded {recorded}, replayed {replayed}"
    )]
    DrawMismatch {
        team: TeamId,
        turn_id: usize,
        luck_id: u32,
        recorded: u8,
        replayed: u8,
    },

    #[error(
        "team {team} turn {turn_id}: draw #{luck_id} ({number} vs chance {chance}) recorded as {recorded}"
    )]
    OutcomeMismatch {
        team: TeamId,
        turn_id: usize,
        luck_id: u32,
        chance: u8,
        number: u8,
        recorded: ResultKind,
    },

    #[error("team {team} turn {turn_id}: draw #{luck_id} is not after draw #{previous}")]
    NonMonotonicDraw {
        team: TeamId,
        turn_id: usize,
        luck_id: u32,
        previous: u32,
    },

    #[error("team {team}: last recorded draw #{last_id} exceeds stream count {count}")]
    CountExceeded { team: TeamId, last_id: u32, count: u32 },

    #[error("team {team} is missing from the game")]
    TeamMissing { team: TeamId },

    #[error("turn {turn_id}: snapshot cannot be rebuilt: {error}")]
    SnapshotInvalid { turn_id: usize, error: BoardError },

    #[error("turn {turn_id}: replayed results do not reproduce the next snapshot")]
    HistoryDesync { turn_id: usize },
}

impl GameError for IntegrityError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DrawMismatch { .. } => "INTEGRITY_DRAW_MISMATCH",
            Self::OutcomeMismatch { .. } => "INTEGRITY_OUTCOME_MISMATCH",
            Self::NonMonotonicDraw { .. } => "INTEGRITY_NON_MONOTONIC_DRAW",
            Self::CountExceeded { .. } => "INTEGRITY_COUNT_EXCEEDED",
            Self::TeamMissing { .. } => "INTEGRITY_TEAM_MISSING",
            Self::SnapshotInvalid { .. } => "INTEGRITY_SNAPSHOT_INVALID",
            Self::HistoryDesync { .. } => "INTEGRITY_HISTORY_DESYNC",
        }
    }
}

/// Summary of a successful random audit for one team.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuditReport {
    pub team: TeamId,
    /// Recorded draws re-derived and matched.
    pub draws_checked: u32,
    /// Draws consumed by undone actions and skipped over.
    pub draws_skipped: u32,
    pub last_draw_id: u32,
    pub count: u32,
}

/// Audits `team`'s recorded draws against its starting generator.
///
/// `actions` yields `(turn_id, action)` in history order; actions of other
/// teams are ignored.
pub fn audit_team<'a, I>(
    team: TeamId,
    initial: &Pcg32,
    count: u32,
    actions: I,
) -> Result<AuditReport, IntegrityError>
where
    I: IntoIterator<Item = (usize, &'a Action)>,
{
    let mut stream = RandomState::from_initial(initial.clone(), 0);
    let mut report = AuditReport {
        team,
        count,
        ..AuditReport::default()
    };

    for (turn_id, action) in actions {
        if action.team_id != team {
            continue;
        }
        for result in &action.results {
            let Some(luck) = result.luck else {
                continue;
            };
            if luck.id <= stream.count() {
                return Err(IntegrityError::NonMonotonicDraw {
                    team,
                    turn_id,
                    luck_id: luck.id,
                    previous: stream.count(),
                });
            }
            let gap = luck.id - 1 - stream.count();
            if gap > 0 {
                report.draws_skipped += gap;
                stream = RandomState::from_initial(initial.clone(), luck.id - 1);
            }

            let replayed = stream.draw();
            if replayed.number != luck.number {
                return Err(IntegrityError::DrawMismatch {
                    team,
                    turn_id,
                    luck_id: luck.id,
                    recorded: luck.number,
                    replayed: replayed.number,
                });
            }
            if result.kind != luck.outcome() {
                return Err(IntegrityError::OutcomeMismatch {
                    team,
                    turn_id,
                    luck_id: luck.id,
                    chance: luck.chance,
                    number: luck.number,
                    recorded: result.kind,
                });
            }
            report.draws_checked += 1;
            report.last_draw_id = luck.id;
        }
    }

    if report.last_draw_id > count {
        return Err(IntegrityError::CountExceeded {
            team,
            last_id: report.last_draw_id,
            count,
        });
    }
    Ok(report)
}

/// Audits every team of `state`, halting on the first violation.
///
/// For forked matches only turns from the fork point onward are audited;
/// earlier turns were drawn from the parent's streams.
pub fn audit_game(state: &GameState) -> Result<Vec<AuditReport>, IntegrityError> {
    let from = state
        .forked_from
        .as_ref()
        .map_or(0, |origin| origin.turn_id)
        .min(state.turns.len());
    let current = state.current_turn_id();

    state
        .teams
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let team = slot.as_ref().ok_or(IntegrityError::TeamMissing {
                team: TeamId(index as u8),
            })?;
            let history = state.turns[from..]
                .iter()
                .flat_map(|turn| turn.actions.iter().map(move |action| (turn.id, action)))
                .chain(state.actions.iter().map(|action| (current, action)));
            audit_team(
                team.id,
                team.random_state.initial(),
                team.random_state.count(),
                history,
            )
        })
        .collect()
}

impl GameState {
    /// Replays every turn's results onto its opening snapshot and checks the
    /// outcome against the following snapshot (or the live board for the
    /// turn in progress).
    pub fn verify_history(&self) -> Result<(), IntegrityError> {
        let (width, height) = (self.board.width(), self.board.height());
        for (index, turn) in self.turns.iter().enumerate() {
            let expected = self
                .turns
                .get(index + 1)
                .map_or(self.turn_units.as_slice(), |next| next.units.as_slice());
            replay(width, height, turn.id, &turn.units, &turn.actions, expected)?;
        }
        if self.is_started() {
            replay(
                width,
                height,
                self.current_turn_id(),
                &self.turn_units,
                &self.actions,
                self.board.units(),
            )?;
        }
        Ok(())
    }
}

fn replay(
    width: u32,
    height: u32,
    turn_id: usize,
    opening: &[Unit],
    actions: &[Action],
    expected: &[Unit],
) -> Result<(), IntegrityError> {
    let invalid = |error| IntegrityError::SnapshotInvalid { turn_id, error };
    let mut board = Board::with_units(width, height, opening.to_vec()).map_err(invalid)?;
    for result in actions.iter().flat_map(|action| &action.results) {
        board.apply_result(result).map_err(invalid)?;
    }
    if board.units() != expected {
        return Err(IntegrityError::HistoryDesync { turn_id });
    }
    Ok(())
}
