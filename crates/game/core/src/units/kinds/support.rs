use crate::board::{Board, BoardError, Position};
use crate::combat::Resolver;
use crate::units::{
    CombatCapability, Focusable, StatusEffectSource, StatusKind, Targetable, Unit, UnitId,
    sort_targets,
};

use super::{area_tiles, focus_attack};

/// Heals and cleanses every living ally, itself included.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cleric;

impl Targetable for Cleric {
    fn get_attack_tiles(&self, _board: &Board, unit: &Unit) -> Vec<Position> {
        vec![unit.position]
    }

    fn get_target_units(&self, board: &Board, unit: &Unit, _target: Position) -> Vec<UnitId> {
        let allies = board
            .team_units(unit.team)
            .filter(|ally| !ally.is_dead())
            .collect();
        sort_targets(allies, unit.position)
    }
}

impl StatusEffectSource for Cleric {}
impl Focusable for Cleric {}

impl CombatCapability for Cleric {
    fn get_attack_results(
        &self,
        resolver: &mut Resolver,
        unit: UnitId,
        target: Position,
    ) -> Result<(), BoardError> {
        let cleric = resolver.get_unit(unit)?.clone();
        let amount = cleric.power();
        for ally in self.get_target_units(resolver.board(), &cleric, target) {
            resolver.heal(ally, amount)?;
        }
        Ok(())
    }
}

/// Immobile ward shielding allies on and around the aimed tile from magic.
#[derive(Clone, Copy, Debug, Default)]
pub struct BarrierWard;

impl Targetable for BarrierWard {
    fn get_target_tiles(&self, board: &Board, _unit: &Unit, target: Position) -> Vec<Position> {
        area_tiles(board, target)
    }

    fn accepts_target(&self, unit: &Unit, candidate: &Unit) -> bool {
        candidate.team == unit.team && candidate.id != unit.id
    }
}

impl StatusEffectSource for BarrierWard {
    fn status(&self) -> Option<StatusKind> {
        Some(StatusKind::Barrier)
    }
}

impl Focusable for BarrierWard {}

impl CombatCapability for BarrierWard {
    fn get_attack_results(
        &self,
        resolver: &mut Resolver,
        unit: UnitId,
        target: Position,
    ) -> Result<(), BoardError> {
        focus_attack(self, resolver, unit, target)
    }
}
