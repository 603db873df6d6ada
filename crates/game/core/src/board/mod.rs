//! Grid topology and unit placement.
//!
//! The board owns every live [`Unit`]. Units are kept sorted by id and a tile
//! index mirrors their positions; the index is derived data and is rebuilt
//! whenever a board is deserialized or restored from a snapshot.

mod error;
mod geometry;

use std::collections::VecDeque;

pub use error::BoardError;
pub use geometry::{Direction, Facing, Position};

use crate::combat::UnitResult;
use crate::state::TeamId;
use crate::units::{Unit, UnitId};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "PersistedBoard", into = "PersistedBoard")
)]
pub struct Board {
    width: u32,
    height: u32,
    units: Vec<Unit>,
    tiles: Vec<Option<UnitId>>,
}

impl Board {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            units: Vec::new(),
            tiles: vec![None; width as usize * height as usize],
        }
    }

    /// Builds a board from a unit snapshot.
    pub fn with_units(width: u32, height: u32, units: Vec<Unit>) -> Result<Self, BoardError> {
        let mut board = Self::new(width, height);
        board.restore(units)?;
        Ok(board)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains_position(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.contains_position(position)
            .then(|| position.y as usize * self.width as usize + position.x as usize)
    }

    // ========================================================================
    // Unit lookup
    // ========================================================================

    /// Units ordered by id.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units
            .binary_search_by_key(&id, |unit| unit.id)
            .ok()
            .map(|index| &self.units[index])
    }

    pub fn get_unit(&self, id: UnitId) -> Result<&Unit, BoardError> {
        self.unit(id).ok_or(BoardError::UnitNotFound { unit: id })
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.unit(id).is_some()
    }

    pub fn unit_at(&self, position: Position) -> Option<&Unit> {
        let id = (*self.tiles.get(self.index(position)?)?)?;
        self.unit(id)
    }

    pub fn is_empty_tile(&self, position: Position) -> bool {
        self.index(position)
            .is_some_and(|index| self.tiles[index].is_none())
    }

    /// Units of `team`, ordered by id.
    pub fn team_units(&self, team: TeamId) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(move |unit| unit.team == team)
    }

    pub fn has_living_units(&self, team: TeamId) -> bool {
        self.team_units(team).any(|unit| !unit.is_dead())
    }

    // ========================================================================
    // Geometry queries
    // ========================================================================

    /// Manhattan distance between two tiles.
    pub fn get_distance(&self, a: Position, b: Position) -> u32 {
        a.distance(b)
    }

    /// Direction from `a` to `b` when both share a row or column.
    pub fn get_direction(&self, a: Position, b: Position) -> Result<Direction, BoardError> {
        if a == b || (a.x != b.x && a.y != b.y) {
            return Err(BoardError::NotAligned { from: a, to: b });
        }
        Direction::toward(a, b).ok_or(BoardError::NotAligned { from: a, to: b })
    }

    /// Tiles whose distance from `origin` lies in `[min, max]`, in row-major
    /// order. Occupied tiles are skipped unless `include_occupied` is set.
    pub fn get_tile_range(
        &self,
        origin: Position,
        min: u32,
        max: u32,
        include_occupied: bool,
    ) -> Vec<Position> {
        let reach = max as i32;
        let mut tiles = Vec::new();
        for y in (origin.y - reach)..=(origin.y + reach) {
            for x in (origin.x - reach)..=(origin.x + reach) {
                let tile = Position::new(x, y);
                if !self.contains_position(tile) {
                    continue;
                }
                let distance = origin.distance(tile);
                if distance < min || distance > max {
                    continue;
                }
                if !include_occupied && !self.is_empty_tile(tile) {
                    continue;
                }
                tiles.push(tile);
            }
        }
        tiles
    }

    /// In-bounds orthogonal neighbours, clockwise from north.
    pub fn neighbors(&self, position: Position) -> Vec<Position> {
        Direction::ALL
            .into_iter()
            .map(|direction| position.step(direction))
            .filter(|tile| self.contains_position(*tile))
            .collect()
    }

    /// Up to `length` in-bounds tiles stepping away from `origin`.
    pub fn line_tiles(&self, origin: Position, direction: Direction, length: u32) -> Vec<Position> {
        let mut tiles = Vec::new();
        let mut tile = origin;
        for _ in 0..length {
            tile = tile.step(direction);
            if !self.contains_position(tile) {
                break;
            }
            tiles.push(tile);
        }
        tiles
    }

    /// First occupied tile along `direction`, looking at most `los` tiles away.
    pub fn los_target(&self, origin: Position, direction: Direction, los: u32) -> Option<Position> {
        self.line_tiles(origin, direction, los)
            .into_iter()
            .find(|tile| !self.is_empty_tile(*tile))
    }

    /// Destinations reachable by `unit` this turn, in row-major order.
    ///
    /// Breadth-first over empty or allied tiles up to the unit's mobility;
    /// allied tiles may be passed through but never ended on.
    pub fn move_tiles(&self, id: UnitId) -> Result<Vec<Position>, BoardError> {
        let unit = self.get_unit(id)?;
        let mobility = unit.mobility();
        let mut visited = vec![false; self.tiles.len()];
        let mut queue = VecDeque::new();
        let mut destinations = Vec::new();

        if let Some(start) = self.index(unit.position) {
            visited[start] = true;
        }
        queue.push_back((unit.position, 0u32));

        while let Some((tile, steps)) = queue.pop_front() {
            if steps == mobility {
                continue;
            }
            for next in self.neighbors(tile) {
                let Some(index) = self.index(next) else {
                    continue;
                };
                if visited[index] {
                    continue;
                }
                let passable = match self.unit_at(next) {
                    None => {
                        destinations.push(next);
                        true
                    }
                    Some(other) => other.team == unit.team,
                };
                visited[index] = true;
                if passable {
                    queue.push_back((next, steps + 1));
                }
            }
        }

        destinations.sort_by_key(|tile| tile.row_major());
        Ok(destinations)
    }

    // ========================================================================
    // Placement
    // ========================================================================

    /// Places a new unit on `tile`.
    pub fn assign_unit(&mut self, mut unit: Unit, tile: Position) -> Result<(), BoardError> {
        let index = self
            .index(tile)
            .ok_or(BoardError::OutOfBounds { position: tile })?;
        if let Some(occupant) = self.tiles[index] {
            return Err(BoardError::Occupied {
                position: tile,
                occupant,
            });
        }
        let slot = match self.units.binary_search_by_key(&unit.id, |u| u.id) {
            Ok(_) => return Err(BoardError::DuplicateUnit { unit: unit.id }),
            Err(slot) => slot,
        };
        unit.position = tile;
        self.tiles[index] = Some(unit.id);
        self.units.insert(slot, unit);
        Ok(())
    }

    /// Removes a unit from the board and returns it.
    pub fn drop_unit(&mut self, id: UnitId) -> Result<Unit, BoardError> {
        let slot = self
            .units
            .binary_search_by_key(&id, |unit| unit.id)
            .map_err(|_| BoardError::UnitNotFound { unit: id })?;
        let unit = self.units.remove(slot);
        if let Some(index) = self.index(unit.position) {
            self.tiles[index] = None;
        }
        Ok(unit)
    }

    /// Moves an existing unit to an empty tile.
    pub fn move_unit(&mut self, id: UnitId, tile: Position) -> Result<(), BoardError> {
        let unit = self.get_unit(id)?;
        if unit.position == tile {
            return Ok(());
        }
        let mut unit = self.drop_unit(id)?;
        let origin = unit.position;
        let placed = self.assign_unit(unit.clone(), tile);
        if let Err(err) = placed {
            unit.position = origin;
            self.assign_unit(unit, origin)?;
            return Err(err);
        }
        Ok(())
    }

    /// Applies one recorded result. Units whose health reaches zero are
    /// removed from the board.
    pub fn apply_result(&mut self, result: &UnitResult) -> Result<(), BoardError> {
        if let Some(position) = result.changes.position {
            self.move_unit(result.unit, position)?;
        }
        let slot = self
            .units
            .binary_search_by_key(&result.unit, |unit| unit.id)
            .map_err(|_| BoardError::UnitNotFound { unit: result.unit })?;
        self.units[slot].apply(&result.changes);
        if self.units[slot].is_dead() {
            self.drop_unit(result.unit)?;
        }
        Ok(())
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Copy of the full unit set, ordered by id.
    pub fn snapshot(&self) -> Vec<Unit> {
        self.units.clone()
    }

    /// Replaces the unit set with `units`, rebuilding the tile index.
    pub fn restore(&mut self, units: Vec<Unit>) -> Result<(), BoardError> {
        let mut rebuilt = Self::new(self.width, self.height);
        for unit in units {
            let tile = unit.position;
            rebuilt.assign_unit(unit, tile)?;
        }
        *self = rebuilt;
        Ok(())
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct PersistedBoard {
    width: u32,
    height: u32,
    units: Vec<Unit>,
}

#[cfg(feature = "serde")]
impl TryFrom<PersistedBoard> for Board {
    type Error = BoardError;

    fn try_from(persisted: PersistedBoard) -> Result<Self, Self::Error> {
        Board::with_units(persisted.width, persisted.height, persisted.units)
    }
}

#[cfg(feature = "serde")]
impl From<Board> for PersistedBoard {
    fn from(board: Board) -> Self {
        Self {
            width: board.width,
            height: board.height,
            units: board.units,
        }
    }
}
