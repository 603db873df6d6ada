use std::fmt;

/// Discrete grid position expressed in tile coordinates.
///
/// `y` grows southwards: row `0` is the northern edge of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the neighbouring tile one step in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance between two tiles.
    pub fn distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Row-major sort key used for every deterministic tile ordering.
    pub fn row_major(self) -> (i32, i32) {
        (self.y, self.x)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal facing / movement direction.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[strum(serialize = "N")]
    North,
    #[strum(serialize = "E")]
    East,
    #[strum(serialize = "S")]
    South,
    #[strum(serialize = "W")]
    West,
}

impl Direction {
    /// All directions in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit step for this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Rotates clockwise by the given number of quarter turns.
    pub fn rotate(self, quarter_turns: u8) -> Self {
        let index = Self::ALL
            .iter()
            .position(|&d| d == self)
            .unwrap_or_default();
        Self::ALL[(index + quarter_turns as usize) % 4]
    }

    /// Direction that best points from `from` towards `to`.
    ///
    /// Uses the dominant axis; horizontal wins ties. Returns `None` for the
    /// same tile.
    pub fn toward(from: Position, to: Position) -> Option<Self> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx == 0 && dy == 0 {
            return None;
        }
        Some(if dx.abs() >= dy.abs() {
            if dx > 0 { Direction::East } else { Direction::West }
        } else if dy > 0 {
            Direction::South
        } else {
            Direction::North
        })
    }
}

/// Which side of a unit an attack arrives from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Facing {
    Front,
    Side,
    Back,
}

impl Facing {
    /// Relative facing of an attacker at `attacker` against a unit at
    /// `target` looking towards `direction`.
    ///
    /// Diagonal approaches (equal offsets on both axes) count as side attacks.
    pub fn of(attacker: Position, target: Position, direction: Direction) -> Self {
        let dx = attacker.x - target.x;
        let dy = attacker.y - target.y;
        if dx.abs() == dy.abs() {
            return Facing::Side;
        }
        match Direction::toward(target, attacker) {
            Some(d) if d == direction => Facing::Front,
            Some(d) if d == direction.opposite() => Facing::Back,
            _ => Facing::Side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_is_clockwise() {
        assert_eq!(Direction::North.rotate(1), Direction::East);
        assert_eq!(Direction::North.rotate(2), Direction::South);
        assert_eq!(Direction::North.rotate(3), Direction::West);
        assert_eq!(Direction::West.rotate(1), Direction::North);
    }

    #[test]
    fn toward_prefers_dominant_axis() {
        let origin = Position::new(5, 5);
        assert_eq!(Direction::toward(origin, Position::new(5, 2)), Some(Direction::North));
        assert_eq!(Direction::toward(origin, Position::new(7, 6)), Some(Direction::East));
        assert_eq!(Direction::toward(origin, Position::new(4, 9)), Some(Direction::South));
        assert_eq!(Direction::toward(origin, origin), None);
    }

    #[test]
    fn facing_from_each_side() {
        let target = Position::new(5, 5);
        // Target looks north: attacker north of it is in front.
        assert_eq!(
            Facing::of(Position::new(5, 4), target, Direction::North),
            Facing::Front
        );
        assert_eq!(
            Facing::of(Position::new(5, 6), target, Direction::North),
            Facing::Back
        );
        assert_eq!(
            Facing::of(Position::new(4, 5), target, Direction::North),
            Facing::Side
        );
        assert_eq!(
            Facing::of(Position::new(6, 6), target, Direction::North),
            Facing::Side
        );
    }
}
