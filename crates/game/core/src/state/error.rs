//! Match lifecycle errors.

use crate::board::{BoardError, Position};
use crate::error::{ErrorSeverity, GameError};

/// Join/start/end misuse.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LifecycleError {
    #[error("game has already started")]
    AlreadyStarted,

    #[error("game has not started")]
    NotStarted,

    #[error("game has already ended")]
    AlreadyEnded,

    #[error("team count {count} is outside 2..={max}")]
    InvalidTeamCount { count: usize, max: usize },

    #[error("no open slot left")]
    GameFull,

    #[error("slot {slot} does not exist ({slots} slots)")]
    SlotOutOfRange { slot: usize, slots: usize },

    #[error("slot {slot} is already taken")]
    SlotTaken { slot: usize },

    #[error("player {player_id} already joined")]
    PlayerAlreadyJoined { player_id: String },

    #[error("{open} slot(s) are still open")]
    SlotsOpen { open: usize },

    #[error("board {width}x{height} is outside 1..={max} per side")]
    InvalidBoardSize { width: u32, height: u32, max: u32 },

    #[error("team set is empty")]
    EmptySet,

    #[error("team set tile {position} is invalid")]
    InvalidSetTile { position: Position },

    #[error("side deployment requires a square board ({width}x{height})")]
    BoardNotSquare { width: u32, height: u32 },

    #[error("turn {turn_id} does not exist")]
    TurnNotFound { turn_id: usize },

    #[error("expected {expected} seeds, got {got}")]
    SeedCount { expected: usize, got: usize },

    #[error("board setup failed: {0}")]
    Board(#[from] BoardError),
}

impl GameError for LifecycleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Board(err) => err.severity(),
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyStarted => "LIFECYCLE_ALREADY_STARTED",
            Self::NotStarted => "LIFECYCLE_NOT_STARTED",
            Self::AlreadyEnded => "LIFECYCLE_ALREADY_ENDED",
            Self::InvalidTeamCount { .. } => "LIFECYCLE_INVALID_TEAM_COUNT",
            Self::GameFull => "LIFECYCLE_GAME_FULL",
            Self::SlotOutOfRange { .. } => "LIFECYCLE_SLOT_OUT_OF_RANGE",
            Self::SlotTaken { .. } => "LIFECYCLE_SLOT_TAKEN",
            Self::PlayerAlreadyJoined { .. } => "LIFECYCLE_PLAYER_ALREADY_JOINED",
            Self::SlotsOpen { .. } => "LIFECYCLE_SLOTS_OPEN",
            Self::InvalidBoardSize { .. } => "LIFECYCLE_INVALID_BOARD_SIZE",
            Self::EmptySet => "LIFECYCLE_EMPTY_SET",
            Self::InvalidSetTile { .. } => "LIFECYCLE_INVALID_SET_TILE",
            Self::BoardNotSquare { .. } => "LIFECYCLE_BOARD_NOT_SQUARE",
            Self::TurnNotFound { .. } => "LIFECYCLE_TURN_NOT_FOUND",
            Self::SeedCount { .. } => "LIFECYCLE_SEED_COUNT",
            Self::Board(err) => err.error_code(),
        }
    }
}
