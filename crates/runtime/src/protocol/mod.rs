//! Request/reply command protocol.
//!
//! A [`ProtocolHost`] runs the game rules in a sandbox (for local play or
//! prediction) and answers [`Request`]s with [`Response`]s. A
//! [`ProtocolClient`] tags each call with an id and keeps a registry of
//! pending reply slots, fulfilled when the matching `Reply` arrives.
//!
//! Messages are JSON-friendly: calls carry a method name and a JSON object of
//! camelCase arguments.

mod client;
mod dispatch;
mod host;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use game_core::{EngineError, ErrorSeverity, GameError, GameOptions, GameState};

use crate::events::SyncData;

pub use client::ProtocolClient;
pub use host::ProtocolHost;

/// Payload of [`Request::Create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGame {
    pub id: String,
    pub options: GameOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    /// Creates a fresh match, replacing any hosted one.
    Create { data: CreateGame },
    /// Hosts an existing match as-is.
    Restart { data: Box<GameState> },
    Call {
        id: u64,
        method: String,
        #[serde(default)]
        args: Value,
    },
}

/// Failure carried back inside a [`Response::Reply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyFault {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    /// First snapshot after create or restart.
    Init { data: SyncData },
    /// Snapshot after a call changed the match.
    Sync { data: SyncData },
    /// Answer to [`Request::Call`], echoing its id and method.
    Reply {
        id: u64,
        method: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ReplyFault>,
    },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown method {0:?}")]
    UnknownMethod(String),

    #[error("bad arguments for {method}: {source}")]
    BadArgs {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no game is hosted")]
    NoGame,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("remote call failed with {}: {}", .0.code, .0.message)]
    Fault(ReplyFault),

    #[error("failed to compute state digest: {0}")]
    Digest(#[from] bincode::Error),

    #[error("pending reply registry lock was poisoned")]
    RegistryPoisoned,

    #[error("protocol channel closed")]
    ChannelClosed,
}

impl GameError for ProtocolError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Engine(err) => err.severity(),
            Self::UnknownMethod(_) | Self::BadArgs { .. } | Self::NoGame | Self::Fault(_) => {
                ErrorSeverity::Validation
            }
            Self::Digest(_) | Self::RegistryPoisoned | Self::ChannelClosed => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownMethod(_) => "PROTOCOL_UNKNOWN_METHOD",
            Self::BadArgs { .. } => "PROTOCOL_BAD_ARGS",
            Self::NoGame => "PROTOCOL_NO_GAME",
            Self::Engine(err) => err.error_code(),
            Self::Fault(_) => "PROTOCOL_REMOTE_FAULT",
            Self::Digest(_) => "PROTOCOL_DIGEST",
            Self::RegistryPoisoned => "PROTOCOL_REGISTRY_POISONED",
            Self::ChannelClosed => "PROTOCOL_CHANNEL_CLOSED",
        }
    }
}

impl From<&ProtocolError> for ReplyFault {
    fn from(err: &ProtocolError) -> Self {
        match err {
            ProtocolError::Fault(fault) => fault.clone(),
            other => ReplyFault {
                code: other.error_code().to_string(),
                message: other.to_string(),
            },
        }
    }
}
