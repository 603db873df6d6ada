//! Per-kind rule implementations.
//!
//! Each kind is a zero-sized type. Empty trait impls opt into the shared
//! default behaviour.

mod focus;
mod magic;
mod melee;
mod ranged;
mod support;

pub use focus::{Enchantress, PoisonWisp};
pub use magic::{DarkMagicWitch, LightningWard, Pyromancer};
pub use melee::{Knight, StoneGolem};
pub use ranged::Scout;
pub use support::{BarrierWard, Cleric};

use crate::board::{Board, BoardError, Position};
use crate::combat::Resolver;

use super::{CombatCapability, StatusEffectSource, Targetable, UnitId};

/// Aimed tile plus its orthogonal neighbours.
fn area_tiles(board: &Board, target: Position) -> Vec<Position> {
    let mut tiles = vec![target];
    tiles.extend(board.neighbors(target));
    tiles
}

/// Regular attack of a focus kind: face the target and focus every affected
/// unit with the kind's status.
fn focus_attack<C>(
    rules: &C,
    resolver: &mut Resolver,
    unit: UnitId,
    target: Position,
) -> Result<(), BoardError>
where
    C: CombatCapability + ?Sized,
{
    let Some(status) = rules.status() else {
        return Ok(());
    };
    let source = resolver.get_unit(unit)?.clone();
    let targets = rules.get_target_units(resolver.board(), &source, target);
    resolver.face(unit, target)?;
    resolver.focus(unit, &targets, status)
}
