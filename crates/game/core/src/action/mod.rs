//! Player actions and their validation/resolution pipeline.
//!
//! An [`ActionRequest`] is what a player (or bot, or the turn timer) submits.
//! The pipeline runs in two phases against the current [`GameState`]:
//!
//! - [`pre_validate`]: legality checks, no mutation
//! - [`resolve`]: computes the results on scratch copies of the board and the
//!   acting team's random stream
//!
//! The engine commits a [`Resolution`](crate::combat::Resolution) only when
//! both phases succeed, producing the recorded [`Action`].

mod error;
mod execute;

pub use error::ValidationError;
pub use execute::{end_turn_results, pre_validate, resolve};

use crate::board::{Direction, Position};
use crate::combat::{Luck, UnitResult};
use crate::state::TeamId;
use crate::units::UnitId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "camelCase")]
pub enum ActionKind {
    Move,
    Attack,
    AttackSpecial,
    Turn,
    EndTurn,
    Surrender,
}

impl ActionKind {
    /// Actions performed by a selected unit.
    pub const fn is_unit_action(self) -> bool {
        matches!(
            self,
            ActionKind::Move | ActionKind::Attack | ActionKind::AttackSpecial | ActionKind::Turn
        )
    }

    pub const fn is_attack(self) -> bool {
        matches!(self, ActionKind::Attack | ActionKind::AttackSpecial)
    }
}

/// Submitted action, before validation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRequest {
    pub kind: ActionKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub unit: Option<UnitId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Option<Position>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub direction: Option<Direction>,
}

impl ActionRequest {
    fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            unit: None,
            target: None,
            direction: None,
        }
    }

    /// Moves `unit` to `target`, optionally ending with a chosen facing.
    pub fn move_to(unit: UnitId, target: Position, direction: Option<Direction>) -> Self {
        Self {
            unit: Some(unit),
            target: Some(target),
            direction,
            ..Self::new(ActionKind::Move)
        }
    }

    pub fn attack(unit: UnitId, target: Position) -> Self {
        Self {
            unit: Some(unit),
            target: Some(target),
            ..Self::new(ActionKind::Attack)
        }
    }

    pub fn attack_special(unit: UnitId, target: Position) -> Self {
        Self {
            unit: Some(unit),
            target: Some(target),
            ..Self::new(ActionKind::AttackSpecial)
        }
    }

    pub fn turn(unit: UnitId, direction: Direction) -> Self {
        Self {
            unit: Some(unit),
            direction: Some(direction),
            ..Self::new(ActionKind::Turn)
        }
    }

    pub fn end_turn() -> Self {
        Self::new(ActionKind::EndTurn)
    }

    pub fn surrender() -> Self {
        Self::new(ActionKind::Surrender)
    }
}

/// Recorded action. `results` is the ground truth of what happened.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub kind: ActionKind,
    pub team_id: TeamId,
    pub unit: Option<UnitId>,
    pub target: Option<Position>,
    pub direction: Option<Direction>,
    pub results: Vec<UnitResult>,
    /// Synthesized by the engine (timeout or exhausted budget) rather than
    /// submitted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub forced: bool,
}

impl Action {
    pub fn from_request(
        request: &ActionRequest,
        team_id: TeamId,
        results: Vec<UnitResult>,
        forced: bool,
    ) -> Self {
        Self {
            kind: request.kind,
            team_id,
            unit: request.unit,
            target: request.target,
            direction: request.direction,
            results,
            forced,
        }
    }

    /// Luck records in result order.
    pub fn lucks(&self) -> impl Iterator<Item = &Luck> {
        self.results.iter().filter_map(|result| result.luck.as_ref())
    }

    pub fn has_luck(&self) -> bool {
        self.lucks().next().is_some()
    }
}
