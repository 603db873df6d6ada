use crate::board::{Board, Direction, Position};
use crate::combat::DamageType;
use crate::config::GameConfig;
use crate::units::{CombatCapability, Focusable, StatusEffectSource, Targetable, Unit};

use super::area_tiles;

/// Magic blast hitting the aimed tile and its neighbours, friend or foe.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pyromancer;

impl Targetable for Pyromancer {
    fn get_target_tiles(&self, board: &Board, _unit: &Unit, target: Position) -> Vec<Position> {
        area_tiles(board, target)
    }
}

impl StatusEffectSource for Pyromancer {}
impl Focusable for Pyromancer {}

impl CombatCapability for Pyromancer {
    fn damage_type(&self) -> DamageType {
        DamageType::Magic
    }
}

/// Immobile single-target magic attacker.
#[derive(Clone, Copy, Debug, Default)]
pub struct LightningWard;

impl Targetable for LightningWard {}
impl StatusEffectSource for LightningWard {}
impl Focusable for LightningWard {}

impl CombatCapability for LightningWard {
    fn damage_type(&self) -> DamageType {
        DamageType::Magic
    }
}

/// Magic beam along a cardinal line; every unit in the beam is hit.
#[derive(Clone, Copy, Debug, Default)]
pub struct DarkMagicWitch;

impl Targetable for DarkMagicWitch {
    fn get_attack_tiles(&self, board: &Board, unit: &Unit) -> Vec<Position> {
        let mut tiles: Vec<Position> = Direction::ALL
            .into_iter()
            .flat_map(|direction| board.line_tiles(unit.position, direction, GameConfig::BEAM_LENGTH))
            .collect();
        tiles.sort_by_key(|tile| tile.row_major());
        tiles
    }

    fn get_target_tiles(&self, board: &Board, unit: &Unit, target: Position) -> Vec<Position> {
        match board.get_direction(unit.position, target) {
            Ok(direction) => board.line_tiles(unit.position, direction, GameConfig::BEAM_LENGTH),
            Err(_) => Vec::new(),
        }
    }
}

impl StatusEffectSource for DarkMagicWitch {}
impl Focusable for DarkMagicWitch {}

impl CombatCapability for DarkMagicWitch {
    fn damage_type(&self) -> DamageType {
        DamageType::Magic
    }
}
