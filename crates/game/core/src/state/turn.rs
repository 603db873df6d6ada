use chrono::{DateTime, Utc};

use crate::action::{Action, ActionKind};
use crate::combat::Luck;
use crate::units::Unit;

use super::TeamId;

/// Sealed record of one team's turn.
///
/// `units` is the board as it stood when the turn opened; replaying
/// `actions[].results` onto it reproduces the opening board of the next turn.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Turn {
    pub id: usize,
    pub team_id: TeamId,
    pub started_at: DateTime<Utc>,
    pub units: Vec<Unit>,
    pub actions: Vec<Action>,
}

impl Turn {
    /// A turn in which the team did nothing but end it.
    pub fn is_pass(&self) -> bool {
        self.actions
            .iter()
            .all(|action| action.kind == ActionKind::EndTurn)
    }

    pub fn lucks(&self) -> impl Iterator<Item = &Luck> {
        self.actions.iter().flat_map(Action::lucks)
    }

    pub fn has_luck(&self) -> bool {
        self.lucks().next().is_some()
    }
}
