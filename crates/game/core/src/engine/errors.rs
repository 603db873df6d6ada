//! Engine error types.

use crate::action::ValidationError;
use crate::audit::IntegrityError;
use crate::board::BoardError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::LifecycleError;

/// Undo request failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UndoError {
    #[error("undo is disabled for this game")]
    Disabled,

    #[error("undo is only possible while the game is active")]
    GameNotActive,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("undo requires approval from the opposing team")]
    ApprovalRequired,

    #[error("the previous turn was not played by the requesting team")]
    NotRequestersTurn,

    #[error("the opposing team has already acted")]
    OpponentActed,

    #[error("a surrender cannot be undone")]
    Irreversible,

    #[error("snapshot restore failed: {0}")]
    Board(#[from] BoardError),
}

impl GameError for UndoError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ApprovalRequired => ErrorSeverity::Recoverable,
            Self::Board(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Disabled => "UNDO_DISABLED",
            Self::GameNotActive => "UNDO_GAME_NOT_ACTIVE",
            Self::NothingToUndo => "UNDO_NOTHING_TO_UNDO",
            Self::ApprovalRequired => "UNDO_APPROVAL_REQUIRED",
            Self::NotRequestersTurn => "UNDO_NOT_REQUESTERS_TURN",
            Self::OpponentActed => "UNDO_OPPONENT_ACTED",
            Self::Irreversible => "UNDO_IRREVERSIBLE",
            Self::Board(err) => err.error_code(),
        }
    }
}

/// Errors surfaced while driving a match through the engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineError {
    #[error("invalid action: {0}")]
    Validation(#[from] ValidationError),

    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("undo rejected: {0}")]
    Undo(#[from] UndoError),

    #[error("board error: {0}")]
    Board(#[from] BoardError),

    #[error("integrity violation: {0}")]
    Integrity(#[from] IntegrityError),
}

impl GameError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation(err) => err.severity(),
            Self::Lifecycle(err) => err.severity(),
            Self::Undo(err) => err.severity(),
            Self::Board(err) => err.severity(),
            Self::Integrity(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.error_code(),
            Self::Lifecycle(err) => err.error_code(),
            Self::Undo(err) => err.error_code(),
            Self::Board(err) => err.error_code(),
            Self::Integrity(err) => err.error_code(),
        }
    }
}
