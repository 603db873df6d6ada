use std::fmt;

use crate::board::{Direction, Position};
use crate::random::RandomState;
use crate::units::UnitKind;

/// Final team index, fixed at game start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TeamId(pub u8);

impl TeamId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Board side a team deploys on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TeamPosition {
    #[default]
    South,
    North,
    West,
    East,
}

impl TeamPosition {
    /// Side assigned to team `id` in a match of `team_count` teams; seats
    /// follow play order clockwise from the south.
    pub fn for_team(id: TeamId, team_count: usize) -> Self {
        let seats: &[TeamPosition] = match team_count {
            0..=2 => &[TeamPosition::South, TeamPosition::North],
            3 => &[TeamPosition::South, TeamPosition::West, TeamPosition::North],
            _ => &[
                TeamPosition::South,
                TeamPosition::West,
                TeamPosition::North,
                TeamPosition::East,
            ],
        };
        seats[id.index() % seats.len()]
    }

    /// Clockwise quarter turns from the south side.
    pub const fn quarter_turns(self) -> u8 {
        match self {
            TeamPosition::South => 0,
            TeamPosition::West => 1,
            TeamPosition::North => 2,
            TeamPosition::East => 3,
        }
    }

    /// Maps a south-relative tile onto this side of a `width` x `height` board.
    ///
    /// West and east require a square board.
    pub fn place(self, tile: Position, width: u32, height: u32) -> Position {
        let w = width as i32;
        let h = height as i32;
        match self {
            TeamPosition::South => tile,
            TeamPosition::North => Position::new(w - 1 - tile.x, h - 1 - tile.y),
            TeamPosition::West => Position::new(h - 1 - tile.y, tile.x),
            TeamPosition::East => Position::new(tile.y, w - 1 - tile.x),
        }
    }

    pub fn orient(self, direction: Direction) -> Direction {
        direction.rotate(self.quarter_turns())
    }
}

/// One roster entry, expressed for the south side.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetUnit {
    pub kind: UnitKind,
    pub position: Position,
    #[cfg_attr(feature = "serde", serde(default = "default_facing"))]
    pub direction: Direction,
}

#[cfg(feature = "serde")]
fn default_facing() -> Direction {
    Direction::North
}

/// Roster snapshot a team brings into the match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamSet {
    pub name: String,
    pub units: Vec<SetUnit>,
}

/// Parameters supplied when a player joins.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinRequest {
    pub player_id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub color_id: u8,
    pub set: TeamSet,
    #[cfg_attr(feature = "serde", serde(default = "default_use_random"))]
    pub use_random: bool,
}

#[cfg(feature = "serde")]
fn default_use_random() -> bool {
    true
}

impl JoinRequest {
    pub fn new(player_id: impl Into<String>, name: impl Into<String>, set: TeamSet) -> Self {
        Self {
            player_id: player_id.into(),
            name: name.into(),
            color_id: 0,
            set,
            use_random: true,
        }
    }

    pub fn with_color(mut self, color_id: u8) -> Self {
        self.color_id = color_id;
        self
    }

    pub fn with_use_random(mut self, use_random: bool) -> Self {
        self.use_random = use_random;
        self
    }
}

/// One player's side of the match.
///
/// `random_state` is seeded once at join and survives every undo.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Team {
    pub id: TeamId,
    /// Join index, kept after `id` is reassigned at start.
    pub slot: usize,
    pub player_id: String,
    pub name: String,
    pub color_id: u8,
    pub position: TeamPosition,
    pub set: TeamSet,
    pub use_random: bool,
    pub random_state: RandomState,
}

impl Team {
    pub fn new(slot: usize, join: JoinRequest, seed: u64) -> Self {
        Self {
            id: TeamId(slot as u8),
            slot,
            player_id: join.player_id,
            name: join.name,
            color_id: join.color_id,
            position: TeamPosition::South,
            set: join.set,
            use_random: join.use_random,
            random_state: RandomState::create(seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_rotate_the_south_layout() {
        let tile = Position::new(2, 10);
        assert_eq!(TeamPosition::South.place(tile, 11, 11), tile);
        assert_eq!(TeamPosition::North.place(tile, 11, 11), Position::new(8, 0));
        assert_eq!(TeamPosition::West.place(tile, 11, 11), Position::new(0, 2));
        assert_eq!(TeamPosition::East.place(tile, 11, 11), Position::new(10, 8));
    }

    #[test]
    fn facing_turns_toward_the_center() {
        assert_eq!(TeamPosition::North.orient(Direction::North), Direction::South);
        assert_eq!(TeamPosition::West.orient(Direction::North), Direction::East);
        assert_eq!(TeamPosition::East.orient(Direction::North), Direction::West);
    }

    #[test]
    fn seats_follow_team_count() {
        assert_eq!(TeamPosition::for_team(TeamId(1), 2), TeamPosition::North);
        assert_eq!(TeamPosition::for_team(TeamId(1), 4), TeamPosition::West);
        assert_eq!(TeamPosition::for_team(TeamId(3), 4), TeamPosition::East);
    }
}
