//! Recorded per-unit results.
//!
//! Results are the ground truth of a turn: they carry absolute post-action
//! values rather than deltas, so applying the same result twice is harmless
//! and replay never recomputes anything from the originating request.

use crate::units::{StatusKind, UnitId};
use crate::board::{Direction, Position};

/// What happened to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResultKind {
    Move,
    Turn,
    Hit,
    Block,
    /// Magic nullified by a barrier.
    Immune,
    Heal,
    Focus,
    BreakFocus,
    Recovery,
    Surrender,
}

impl ResultKind {
    /// Whether this kind can carry a luck record.
    pub const fn is_chance_outcome(self) -> bool {
        matches!(self, ResultKind::Hit | ResultKind::Block)
    }
}

/// Record of one random draw used to resolve a chance outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Luck {
    /// 1-based ordinal of the acting team's draw.
    pub id: u32,
    /// Chance to hit at resolution time.
    pub chance: u8,
    /// Drawn value in `[0, 100)`.
    pub number: u8,
}

impl Luck {
    /// Outcome implied by this draw.
    pub const fn outcome(&self) -> ResultKind {
        if self.number < self.chance {
            ResultKind::Hit
        } else {
            ResultKind::Block
        }
    }
}

/// Absolute unit field values after a result. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UnitChanges {
    pub position: Option<Position>,
    pub direction: Option<Direction>,
    pub m_health: Option<i32>,
    pub m_recovery: Option<u8>,
    pub focusing: Option<Vec<UnitId>>,
    pub paralyzed: Option<Vec<UnitId>>,
    pub poisoned: Option<Vec<UnitId>>,
    pub barriered: Option<Vec<UnitId>>,
    pub armored: Option<Vec<UnitId>>,
}

impl UnitChanges {
    /// Changes setting a single status source list.
    pub fn status(status: StatusKind, sources: Vec<UnitId>) -> Self {
        let mut changes = Self::default();
        changes.set_status(status, sources);
        changes
    }

    pub fn set_status(&mut self, status: StatusKind, sources: Vec<UnitId>) {
        let slot = match status {
            StatusKind::Paralysis => &mut self.paralyzed,
            StatusKind::Poison => &mut self.poisoned,
            StatusKind::Barrier => &mut self.barriered,
            StatusKind::Armor => &mut self.armored,
        };
        *slot = Some(sources);
    }

    /// Status lists present in these changes.
    pub fn status_lists(&self) -> impl Iterator<Item = (StatusKind, &Vec<UnitId>)> {
        [
            (StatusKind::Paralysis, &self.paralyzed),
            (StatusKind::Poison, &self.poisoned),
            (StatusKind::Barrier, &self.barriered),
            (StatusKind::Armor, &self.armored),
        ]
        .into_iter()
        .filter_map(|(status, list)| list.as_ref().map(|list| (status, list)))
    }
}

/// One entry of an action's `results[]`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitResult {
    pub unit: UnitId,
    pub kind: ResultKind,
    pub changes: UnitChanges,
    pub luck: Option<Luck>,
}

impl UnitResult {
    pub fn new(unit: UnitId, kind: ResultKind) -> Self {
        Self {
            unit,
            kind,
            changes: UnitChanges::default(),
            luck: None,
        }
    }

    pub fn with_changes(mut self, changes: UnitChanges) -> Self {
        self.changes = changes;
        self
    }

    pub fn with_luck(mut self, luck: Option<Luck>) -> Self {
        self.luck = luck;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_number_and_chance_is_a_block() {
        let luck = Luck {
            id: 1,
            chance: 60,
            number: 60,
        };
        assert_eq!(luck.outcome(), ResultKind::Block);
        assert_eq!(Luck { number: 59, ..luck }.outcome(), ResultKind::Hit);
    }

    #[test]
    fn status_lists_yield_only_present_entries() {
        let mut changes = UnitChanges::status(StatusKind::Poison, vec![UnitId(3)]);
        changes.set_status(StatusKind::Armor, Vec::new());
        let lists: Vec<_> = changes.status_lists().map(|(s, l)| (s, l.len())).collect();
        assert_eq!(lists, vec![(StatusKind::Poison, 1), (StatusKind::Armor, 0)]);
    }
}
