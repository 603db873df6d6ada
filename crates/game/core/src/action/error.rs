//! Action validation errors.

use crate::board::{BoardError, Position};
use crate::error::{ErrorSeverity, GameError};
use crate::state::TeamId;
use crate::units::UnitId;

/// Illegal action. Raised before any mutation; the caller may resubmit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationError {
    #[error("game has not started")]
    GameNotStarted,

    #[error("game has ended")]
    GameEnded,

    #[error("team {team} is not the current team ({current})")]
    NotCurrentTeam { team: TeamId, current: TeamId },

    #[error("team {team} not found")]
    TeamNotFound { team: TeamId },

    #[error("action requires a unit")]
    MissingUnit,

    #[error("action requires a target")]
    MissingTarget,

    #[error("action requires a direction")]
    MissingDirection,

    #[error("unit {unit} not found")]
    UnitNotFound { unit: UnitId },

    #[error("unit {unit} does not belong to team {team}")]
    NotOwnUnit { unit: UnitId, team: TeamId },

    #[error("unit {unit} is paralyzed")]
    UnitParalyzed { unit: UnitId },

    #[error("unit {unit} is recovering for {turns} more turn(s)")]
    UnitRecovering { unit: UnitId, turns: u8 },

    #[error("unit {selected} already acted this turn")]
    OtherUnitSelected { selected: UnitId },

    #[error("unit {unit} already moved this turn")]
    AlreadyMoved { unit: UnitId },

    #[error("unit {unit} already attacked this turn")]
    AlreadyAttacked { unit: UnitId },

    #[error("unit {unit} has no special attack")]
    NoSpecialAttack { unit: UnitId },

    #[error("target {target} is not a legal tile for unit {unit}")]
    InvalidTarget { unit: UnitId, target: Position },

    #[error("attack on {target} would not affect any unit")]
    NoTargets { target: Position },

    #[error("board query failed: {0}")]
    Board(#[from] BoardError),
}

impl GameError for ValidationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnitRecovering { .. } | Self::UnitParalyzed { .. } => ErrorSeverity::Recoverable,
            Self::Board(err) => err.severity(),
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::GameNotStarted => "ACTION_GAME_NOT_STARTED",
            Self::GameEnded => "ACTION_GAME_ENDED",
            Self::NotCurrentTeam { .. } => "ACTION_NOT_CURRENT_TEAM",
            Self::TeamNotFound { .. } => "ACTION_TEAM_NOT_FOUND",
            Self::MissingUnit => "ACTION_MISSING_UNIT",
            Self::MissingTarget => "ACTION_MISSING_TARGET",
            Self::MissingDirection => "ACTION_MISSING_DIRECTION",
            Self::UnitNotFound { .. } => "ACTION_UNIT_NOT_FOUND",
            Self::NotOwnUnit { .. } => "ACTION_NOT_OWN_UNIT",
            Self::UnitParalyzed { .. } => "ACTION_UNIT_PARALYZED",
            Self::UnitRecovering { .. } => "ACTION_UNIT_RECOVERING",
            Self::OtherUnitSelected { .. } => "ACTION_OTHER_UNIT_SELECTED",
            Self::AlreadyMoved { .. } => "ACTION_ALREADY_MOVED",
            Self::AlreadyAttacked { .. } => "ACTION_ALREADY_ATTACKED",
            Self::NoSpecialAttack { .. } => "ACTION_NO_SPECIAL_ATTACK",
            Self::InvalidTarget { .. } => "ACTION_INVALID_TARGET",
            Self::NoTargets { .. } => "ACTION_NO_TARGETS",
            Self::Board(err) => err.error_code(),
        }
    }
}
