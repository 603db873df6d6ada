//! Board placement and geometry errors.

use crate::board::Position;
use crate::error::{ErrorSeverity, GameError};
use crate::units::UnitId;

/// Errors raised by board queries and placement operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoardError {
    /// Position lies outside the board.
    #[error("position {position} is outside the board")]
    OutOfBounds { position: Position },

    /// Tile already holds another unit.
    #[error("tile {position} is already occupied by unit {occupant}")]
    Occupied {
        position: Position,
        occupant: UnitId,
    },

    /// Unit id is not present on the board.
    #[error("unit {unit} is not on the board")]
    UnitNotFound { unit: UnitId },

    /// Unit id is already present on the board.
    #[error("unit {unit} is already on the board")]
    DuplicateUnit { unit: UnitId },

    /// Tiles are not on a shared row or column.
    #[error("tiles {from} and {to} are not axis-aligned")]
    NotAligned { from: Position, to: Position },
}

impl GameError for BoardError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::OutOfBounds { .. } | Self::NotAligned { .. } => ErrorSeverity::Validation,
            Self::Occupied { .. } => ErrorSeverity::Recoverable,
            Self::UnitNotFound { .. } | Self::DuplicateUnit { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfBounds { .. } => "BOARD_OUT_OF_BOUNDS",
            Self::Occupied { .. } => "BOARD_OCCUPIED",
            Self::UnitNotFound { .. } => "BOARD_UNIT_NOT_FOUND",
            Self::DuplicateUnit { .. } => "BOARD_DUPLICATE_UNIT",
            Self::NotAligned { .. } => "BOARD_NOT_ALIGNED",
        }
    }
}
