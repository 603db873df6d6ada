use crate::state::UndoMode;

/// Ruleset tunables shared by every match of a given ruleset.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Board width in tiles.
    pub board_width: u32,
    /// Board height in tiles.
    pub board_height: u32,
    /// Seconds a team may spend on a turn before a forced pass is issued.
    /// `None` disables the turn timer.
    pub turn_time_limit: Option<u32>,
    /// Consecutive passed turns (across all teams) that end the match in a draw.
    pub passed_turn_limit: u32,
    /// Number of most recent turns carried by a sync projection.
    pub recent_turn_window: usize,
}

impl GameConfig {
    // ===== compile-time constants =====
    /// Maximum number of teams in a match (one per board side).
    pub const MAX_TEAMS: usize = 4;
    /// Stand-in roll used whenever a chance is resolved without randomness.
    pub const FIXED_ROLL: u8 = 50;
    /// Armor percentage granted by each armor source focusing a unit.
    pub const ARMOR_PER_SOURCE: i32 = 25;
    /// Power removed by each poison source focusing a unit.
    pub const POISON_PER_SOURCE: i32 = 6;
    /// Length of the Dark Magic Witch beam.
    pub const BEAM_LENGTH: u32 = 4;

    /// Largest board side accepted when a match is created.
    pub const MAX_BOARD_SIZE: u32 = 64;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_BOARD_SIZE: u32 = 11;
    pub const DEFAULT_PASSED_TURN_LIMIT: u32 = 6;
    pub const DEFAULT_RECENT_TURN_WINDOW: usize = 5;

    pub fn new() -> Self {
        Self {
            board_width: Self::DEFAULT_BOARD_SIZE,
            board_height: Self::DEFAULT_BOARD_SIZE,
            turn_time_limit: None,
            passed_turn_limit: Self::DEFAULT_PASSED_TURN_LIMIT,
            recent_turn_window: Self::DEFAULT_RECENT_TURN_WINDOW,
        }
    }

    pub fn with_turn_time_limit(mut self, seconds: u32) -> Self {
        self.turn_time_limit = Some(seconds);
        self
    }

    pub fn with_board_size(mut self, width: u32, height: u32) -> Self {
        self.board_width = width;
        self.board_height = height;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-match options chosen when the game is created.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameOptions {
    /// Ruleset identifier (e.g. `"classic"`).
    pub ruleset: String,
    pub team_count: usize,
    pub undo_mode: Option<UndoMode>,
    pub random_hit_chance: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub config: GameConfig,
}

impl GameOptions {
    pub const DEFAULT_RULESET: &'static str = "classic";

    pub fn new(team_count: usize) -> Self {
        Self {
            ruleset: Self::DEFAULT_RULESET.to_string(),
            team_count,
            undo_mode: Some(UndoMode::Strict),
            random_hit_chance: true,
            config: GameConfig::default(),
        }
    }

    pub fn with_undo_mode(mut self, undo_mode: Option<UndoMode>) -> Self {
        self.undo_mode = undo_mode;
        self
    }

    pub fn with_random_hit_chance(mut self, enabled: bool) -> Self {
        self.random_hit_chance = enabled;
        self
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }
}
