//! Unit rule engine.
//!
//! Every unit kind is a variant of the closed [`UnitKind`] enum and resolves
//! its behaviour through a zero-sized rules type implementing
//! [`CombatCapability`]. Capabilities are composed from smaller traits so a
//! kind only overrides the targeting shape or status handling it needs.
//!
//! Live unit state ([`Unit`]) is owned by the board. Status effects are stored
//! as source lists (which units are focusing this one) so that every focus
//! relationship can be torn down atomically from either side.

mod capability;
mod kinds;
mod stats;
mod status;

use std::fmt;

pub use capability::{CombatCapability, Focusable, StatusEffectSource, Targetable, sort_targets};
pub use kinds::{
    BarrierWard, Cleric, DarkMagicWitch, Enchantress, Knight, LightningWard, PoisonWisp,
    Pyromancer, Scout, StoneGolem,
};
pub use stats::UnitStats;
pub use status::StatusKind;

use crate::board::{Direction, Position};
use crate::combat::UnitChanges;
use crate::config::GameConfig;
use crate::state::TeamId;

/// Board-wide unit identifier, allocated sequentially at game start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Closed set of unit kinds.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitKind {
    Knight,
    Scout,
    Pyromancer,
    Cleric,
    BarrierWard,
    LightningWard,
    PoisonWisp,
    Enchantress,
    DarkMagicWitch,
    StoneGolem,
}

impl UnitKind {
    /// Rules implementation for this kind.
    pub fn rules(self) -> &'static dyn CombatCapability {
        match self {
            UnitKind::Knight => &Knight,
            UnitKind::Scout => &Scout,
            UnitKind::Pyromancer => &Pyromancer,
            UnitKind::Cleric => &Cleric,
            UnitKind::BarrierWard => &BarrierWard,
            UnitKind::LightningWard => &LightningWard,
            UnitKind::PoisonWisp => &PoisonWisp,
            UnitKind::Enchantress => &Enchantress,
            UnitKind::DarkMagicWitch => &DarkMagicWitch,
            UnitKind::StoneGolem => &StoneGolem,
        }
    }
}

/// Live state of one unit on the board.
///
/// `m_health` is a non-positive modifier: the unit is dead once
/// `health + m_health == 0`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub team: TeamId,
    pub position: Position,
    pub direction: Direction,
    pub m_health: i32,
    /// Turns left before this unit may act again.
    pub m_recovery: u8,
    /// Units this one is currently focusing (mirrors their source lists).
    pub focusing: Vec<UnitId>,
    pub paralyzed: Vec<UnitId>,
    pub poisoned: Vec<UnitId>,
    pub barriered: Vec<UnitId>,
    pub armored: Vec<UnitId>,
}

impl Unit {
    pub fn new(
        id: UnitId,
        kind: UnitKind,
        team: TeamId,
        position: Position,
        direction: Direction,
    ) -> Self {
        Self {
            id,
            kind,
            team,
            position,
            direction,
            m_health: 0,
            m_recovery: 0,
            focusing: Vec::new(),
            paralyzed: Vec::new(),
            poisoned: Vec::new(),
            barriered: Vec::new(),
            armored: Vec::new(),
        }
    }

    #[inline]
    pub fn stats(&self) -> &'static UnitStats {
        self.kind.stats()
    }

    #[inline]
    pub fn rules(&self) -> &'static dyn CombatCapability {
        self.kind.rules()
    }

    pub fn health(&self) -> i32 {
        self.stats().health
    }

    /// Remaining hit points.
    pub fn current_health(&self) -> i32 {
        self.health() + self.m_health
    }

    pub fn is_dead(&self) -> bool {
        self.current_health() <= 0
    }

    pub fn is_paralyzed(&self) -> bool {
        !self.paralyzed.is_empty()
    }

    pub fn is_poisoned(&self) -> bool {
        !self.poisoned.is_empty()
    }

    pub fn is_barriered(&self) -> bool {
        !self.barriered.is_empty()
    }

    pub fn is_focusing(&self) -> bool {
        !self.focusing.is_empty()
    }

    /// Whether this unit may be selected to act this turn.
    pub fn can_act(&self) -> bool {
        !self.is_dead() && !self.is_paralyzed() && self.m_recovery == 0
    }

    /// Effective power after poison.
    pub fn power(&self) -> i32 {
        let poison = GameConfig::POISON_PER_SOURCE * self.poisoned.len() as i32;
        (self.stats().power - poison).max(0)
    }

    /// Effective armor percentage after armor sources.
    pub fn armor(&self) -> i32 {
        let bonus = GameConfig::ARMOR_PER_SOURCE * self.armored.len() as i32;
        (self.stats().armor + bonus).clamp(0, 100)
    }

    /// Effective block percentage; paralyzed units cannot block.
    pub fn blocking(&self) -> i32 {
        if self.is_paralyzed() {
            0
        } else {
            self.stats().blocking.clamp(0, 100)
        }
    }

    pub fn mobility(&self) -> u32 {
        self.stats().mobility
    }

    /// Source list for one status.
    pub fn sources(&self, status: StatusKind) -> &[UnitId] {
        match status {
            StatusKind::Paralysis => &self.paralyzed,
            StatusKind::Poison => &self.poisoned,
            StatusKind::Barrier => &self.barriered,
            StatusKind::Armor => &self.armored,
        }
    }

    fn sources_mut(&mut self, status: StatusKind) -> &mut Vec<UnitId> {
        match status {
            StatusKind::Paralysis => &mut self.paralyzed,
            StatusKind::Poison => &mut self.poisoned,
            StatusKind::Barrier => &mut self.barriered,
            StatusKind::Armor => &mut self.armored,
        }
    }

    /// Every unit focusing this one, across all statuses, in id order.
    pub fn all_sources(&self) -> Vec<UnitId> {
        let mut sources: Vec<UnitId> = [
            &self.paralyzed,
            &self.poisoned,
            &self.barriered,
            &self.armored,
        ]
        .into_iter()
        .flatten()
        .copied()
        .collect();
        sources.sort();
        sources.dedup();
        sources
    }

    /// Source list for `status` with `source` removed.
    pub fn sources_without(&self, status: StatusKind, source: UnitId) -> Vec<UnitId> {
        self.sources(status)
            .iter()
            .copied()
            .filter(|id| *id != source)
            .collect()
    }

    /// Source list for `status` with `source` appended (no duplicates).
    pub fn sources_with(&self, status: StatusKind, source: UnitId) -> Vec<UnitId> {
        let mut list = self.sources(status).to_vec();
        if !list.contains(&source) {
            list.push(source);
        }
        list
    }

    /// Overwrites every field present in `changes`.
    pub fn apply(&mut self, changes: &UnitChanges) {
        if let Some(position) = changes.position {
            self.position = position;
        }
        if let Some(direction) = changes.direction {
            self.direction = direction;
        }
        if let Some(m_health) = changes.m_health {
            self.m_health = m_health;
        }
        if let Some(m_recovery) = changes.m_recovery {
            self.m_recovery = m_recovery;
        }
        if let Some(focusing) = &changes.focusing {
            self.focusing = focusing.clone();
        }
        for (status, list) in changes.status_lists() {
            *self.sources_mut(status) = list.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knight() -> Unit {
        Unit::new(
            UnitId(1),
            UnitKind::Knight,
            TeamId(0),
            Position::new(2, 2),
            Direction::North,
        )
    }

    #[test]
    fn statuses_modify_effective_stats() {
        let mut unit = knight();
        assert_eq!(unit.power(), 22);
        assert_eq!(unit.armor(), 40);
        assert_eq!(unit.blocking(), 80);

        unit.poisoned.push(UnitId(9));
        unit.armored.push(UnitId(8));
        unit.armored.push(UnitId(7));
        unit.armored.push(UnitId(6));
        assert_eq!(unit.power(), 22 - GameConfig::POISON_PER_SOURCE);
        assert_eq!(unit.armor(), 100);

        unit.paralyzed.push(UnitId(5));
        assert_eq!(unit.blocking(), 0);
        assert!(!unit.can_act());
    }

    #[test]
    fn apply_overwrites_only_present_fields() {
        let mut unit = knight();
        let changes = UnitChanges {
            m_health: Some(-10),
            barriered: Some(vec![UnitId(4)]),
            ..UnitChanges::default()
        };
        unit.apply(&changes);
        assert_eq!(unit.m_health, -10);
        assert_eq!(unit.barriered, vec![UnitId(4)]);
        assert_eq!(unit.position, Position::new(2, 2));
        assert_eq!(unit.direction, Direction::North);
    }

    #[test]
    fn all_sources_is_sorted_and_unique() {
        let mut unit = knight();
        unit.poisoned = vec![UnitId(7), UnitId(3)];
        unit.paralyzed = vec![UnitId(7)];
        assert_eq!(unit.all_sources(), vec![UnitId(3), UnitId(7)]);
    }
}
