//! Capability traits composed by every unit kind.
//!
//! [`CombatCapability`] is the object-safe entry point used by the action
//! pipeline. Its supertraits supply overridable defaults so that the base
//! behaviour (single-target physical attack with a hit roll) lives in one
//! place and each kind only replaces what differs.

use crate::board::{Board, BoardError, Position};
use crate::combat::{DamageType, Resolver, ResultKind, UnitChanges, UnitResult};

use super::{StatusKind, Unit, UnitId};

/// Targeting shape of a unit's regular attack.
pub trait Targetable {
    /// Tiles the unit may aim its attack at.
    fn get_attack_tiles(&self, board: &Board, unit: &Unit) -> Vec<Position> {
        let (min, max) = unit.stats().range;
        board.get_tile_range(unit.position, min, max, true)
    }

    /// Tiles affected when aiming at `target`.
    fn get_target_tiles(&self, _board: &Board, _unit: &Unit, target: Position) -> Vec<Position> {
        vec![target]
    }

    /// Whether `candidate` on an affected tile is hit by the attack.
    fn accepts_target(&self, unit: &Unit, candidate: &Unit) -> bool {
        candidate.id != unit.id
    }

    /// Units affected when aiming at `target`, in resolution order.
    fn get_target_units(&self, board: &Board, unit: &Unit, target: Position) -> Vec<UnitId> {
        let candidates: Vec<&Unit> = self
            .get_target_tiles(board, unit, target)
            .into_iter()
            .filter_map(|tile| board.unit_at(tile))
            .filter(|candidate| !candidate.is_dead() && self.accepts_target(unit, candidate))
            .collect();
        sort_targets(candidates, target)
    }
}

/// Status granted to focused units, if any.
pub trait StatusEffectSource {
    fn status(&self) -> Option<StatusKind> {
        None
    }
}

/// Ongoing focus relationships.
pub trait Focusable: StatusEffectSource {
    /// Results ending every focus `source` holds: each focused unit loses
    /// `source` from its status list, then `source` clears its own list.
    ///
    /// The trailing self entry is omitted when `source` is no longer on the
    /// board.
    fn get_break_focus_result(&self, board: &Board, source: &Unit) -> Vec<UnitResult> {
        let Some(status) = self.status() else {
            return Vec::new();
        };
        if source.focusing.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<UnitResult> = source
            .focusing
            .iter()
            .filter_map(|id| board.unit(*id))
            .map(|target| {
                UnitResult::new(target.id, ResultKind::BreakFocus).with_changes(
                    UnitChanges::status(status, target.sources_without(status, source.id)),
                )
            })
            .collect();

        if board.contains(source.id) {
            results.push(
                UnitResult::new(source.id, ResultKind::BreakFocus).with_changes(UnitChanges {
                    focusing: Some(Vec::new()),
                    ..UnitChanges::default()
                }),
            );
        }
        results
    }
}

/// Shared combat protocol implemented by every unit kind.
pub trait CombatCapability: Targetable + Focusable + Sync {
    /// Damage type of the regular attack.
    fn damage_type(&self) -> DamageType {
        DamageType::Physical
    }

    /// Whether the regular attack can be blocked.
    fn blockable(&self) -> bool {
        self.damage_type() == DamageType::Physical
    }

    /// Resolves the regular attack aimed at `target` into `resolver`.
    fn get_attack_results(
        &self,
        resolver: &mut Resolver,
        unit: UnitId,
        target: Position,
    ) -> Result<(), BoardError> {
        let attacker = resolver.get_unit(unit)?.clone();
        let targets = self.get_target_units(resolver.board(), &attacker, target);
        resolver.face(unit, target)?;
        for id in targets {
            resolver.strike(unit, id, self.damage_type(), self.blockable())?;
        }
        Ok(())
    }

    fn has_special(&self) -> bool {
        false
    }

    /// Tiles the special attack may be aimed at.
    fn get_special_tiles(&self, _board: &Board, _unit: &Unit) -> Vec<Position> {
        Vec::new()
    }

    /// Units affected by the special attack aimed at `target`.
    fn get_special_target_units(
        &self,
        _board: &Board,
        _unit: &Unit,
        _target: Position,
    ) -> Vec<UnitId> {
        Vec::new()
    }

    fn get_attack_special_results(
        &self,
        _resolver: &mut Resolver,
        _unit: UnitId,
        _target: Position,
    ) -> Result<(), BoardError> {
        Ok(())
    }
}

/// Orders affected units by distance from the aimed tile, then row-major.
pub fn sort_targets(mut units: Vec<&Unit>, target: Position) -> Vec<UnitId> {
    units.sort_by_key(|unit| {
        (
            unit.position.distance(target),
            unit.position.row_major(),
            unit.id,
        )
    });
    units.into_iter().map(|unit| unit.id).collect()
}
