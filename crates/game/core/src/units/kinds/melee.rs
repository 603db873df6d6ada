use crate::board::{Board, BoardError, Position};
use crate::combat::Resolver;
use crate::units::{
    CombatCapability, Focusable, StatusEffectSource, StatusKind, Targetable, Unit, UnitId,
    sort_targets,
};

/// Single-target physical melee.
#[derive(Clone, Copy, Debug, Default)]
pub struct Knight;

impl Targetable for Knight {}
impl StatusEffectSource for Knight {}
impl Focusable for Knight {}
impl CombatCapability for Knight {}

/// Physical melee with a "fortify" special that armors adjacent allies.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoneGolem;

impl Targetable for StoneGolem {}

impl StatusEffectSource for StoneGolem {
    fn status(&self) -> Option<StatusKind> {
        Some(StatusKind::Armor)
    }
}

impl Focusable for StoneGolem {}

impl CombatCapability for StoneGolem {
    fn has_special(&self) -> bool {
        true
    }

    fn get_special_tiles(&self, _board: &Board, unit: &Unit) -> Vec<Position> {
        vec![unit.position]
    }

    fn get_special_target_units(&self, board: &Board, unit: &Unit, _target: Position) -> Vec<UnitId> {
        let allies = board
            .neighbors(unit.position)
            .into_iter()
            .filter_map(|tile| board.unit_at(tile))
            .filter(|ally| ally.team == unit.team && !ally.is_dead())
            .collect();
        sort_targets(allies, unit.position)
    }

    fn get_attack_special_results(
        &self,
        resolver: &mut Resolver,
        unit: UnitId,
        target: Position,
    ) -> Result<(), BoardError> {
        let golem = resolver.get_unit(unit)?.clone();
        let allies = self.get_special_target_units(resolver.board(), &golem, target);
        resolver.focus(unit, &allies, StatusKind::Armor)
    }
}
