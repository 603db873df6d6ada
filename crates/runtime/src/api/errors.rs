//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories, the engine and the
//! command protocol so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{EngineError, ErrorSeverity, GameError, TeamId};

pub use crate::repository::RepositoryError;
use crate::protocol::ProtocolError;
use crate::replica::DesyncError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("game worker command channel closed")]
    CommandChannelClosed,

    #[error("game worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("runtime worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a game state or game options before building")]
    MissingState,

    #[error("no action provider registered for team {team}")]
    ProviderNotSet { team: TeamId },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Desync(#[from] DesyncError),

    #[error("failed to load content: {0}")]
    Content(String),
}

impl RuntimeError {
    /// Severity of the underlying failure, for callers deciding whether to
    /// retry, report, or tear the match down.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Engine(err) => err.severity(),
            Self::Desync(_) => ErrorSeverity::Recoverable,
            Self::ProviderNotSet { .. } | Self::MissingState | Self::Content(_) => {
                ErrorSeverity::Validation
            }
            _ => ErrorSeverity::Internal,
        }
    }
}
