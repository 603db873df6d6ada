use crate::board::{Board, Direction, Position};
use crate::units::{CombatCapability, Focusable, StatusEffectSource, Targetable, Unit};

/// Physical ranged attacker limited to its line of sight along the four
/// cardinal lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scout;

impl Targetable for Scout {
    fn get_attack_tiles(&self, board: &Board, unit: &Unit) -> Vec<Position> {
        let stats = unit.stats();
        let (min, _) = stats.range;
        let mut tiles = Vec::new();
        for direction in Direction::ALL {
            for tile in board.line_tiles(unit.position, direction, stats.los) {
                if unit.position.distance(tile) >= min {
                    tiles.push(tile);
                }
                if !board.is_empty_tile(tile) {
                    break;
                }
            }
        }
        tiles.sort_by_key(|tile| tile.row_major());
        tiles
    }
}

impl StatusEffectSource for Scout {}
impl Focusable for Scout {}
impl CombatCapability for Scout {}
