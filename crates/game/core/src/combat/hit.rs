//! Hit chance calculation.

use crate::board::{Facing, Position};
use crate::units::Unit;

/// Block percentage `target` applies against an attack arriving from `attacker`.
///
/// Full block from the front, half from the side, none from behind.
/// Paralyzed targets never block.
pub fn effective_block(attacker: Position, target: &Unit) -> i32 {
    let block = target.blocking();
    match Facing::of(attacker, target.position, target.direction) {
        Facing::Front => block,
        Facing::Side => block / 2,
        Facing::Back => 0,
    }
}

/// Chance to hit, in percent.
///
/// # Formula
///
/// ```text
/// chance = 100 - effective_block
/// ```
pub fn calculate_hit_chance(attacker: Position, target: &Unit) -> u8 {
    (100 - effective_block(attacker, target)).clamp(0, 100) as u8
}

/// A draw hits only when strictly below the chance.
#[inline]
pub const fn check_hit(chance: u8, number: u8) -> bool {
    number < chance
}
