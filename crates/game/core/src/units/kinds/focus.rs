use crate::board::{Board, BoardError, Position};
use crate::combat::{DamageType, Resolver};
use crate::units::{CombatCapability, Focusable, StatusEffectSource, StatusKind, Targetable, Unit, UnitId};

use super::{area_tiles, focus_attack};

/// Poisons a single enemy for as long as the focus holds.
#[derive(Clone, Copy, Debug, Default)]
pub struct PoisonWisp;

impl Targetable for PoisonWisp {
    fn accepts_target(&self, unit: &Unit, candidate: &Unit) -> bool {
        candidate.team != unit.team
    }
}

impl StatusEffectSource for PoisonWisp {
    fn status(&self) -> Option<StatusKind> {
        Some(StatusKind::Poison)
    }
}

impl Focusable for PoisonWisp {}

impl CombatCapability for PoisonWisp {
    fn damage_type(&self) -> DamageType {
        DamageType::Magic
    }

    fn get_attack_results(
        &self,
        resolver: &mut Resolver,
        unit: UnitId,
        target: Position,
    ) -> Result<(), BoardError> {
        focus_attack(self, resolver, unit, target)
    }
}

/// Paralyzes enemies on and around the aimed tile.
#[derive(Clone, Copy, Debug, Default)]
pub struct Enchantress;

impl Targetable for Enchantress {
    fn get_target_tiles(&self, board: &Board, _unit: &Unit, target: Position) -> Vec<Position> {
        area_tiles(board, target)
    }

    fn accepts_target(&self, unit: &Unit, candidate: &Unit) -> bool {
        candidate.team != unit.team
    }
}

impl StatusEffectSource for Enchantress {
    fn status(&self) -> Option<StatusKind> {
        Some(StatusKind::Paralysis)
    }
}

impl Focusable for Enchantress {}

impl CombatCapability for Enchantress {
    fn damage_type(&self) -> DamageType {
        DamageType::Magic
    }

    fn get_attack_results(
        &self,
        resolver: &mut Resolver,
        unit: UnitId,
        target: Position,
    ) -> Result<(), BoardError> {
        focus_attack(self, resolver, unit, target)
    }
}
