//! Event types for different topics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use game_core::{Action, StateDigest, StateProjection, TeamId, Winner};

/// Events related to lifecycle and action application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameStateEvent {
    TeamJoined { slot: usize, player_id: String },
    Started { game_id: String },
    /// Actions recorded by one command, in order. Includes implicit
    /// turn closes.
    ActionsApplied { actions: Vec<Action> },
    /// A submission was refused; nothing was applied.
    ActionRejected { code: String, message: String },
    Undone { team: TeamId },
    Ended { winner: Winner },
}

/// Events related to turn management (lightweight)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TurnEvent {
    /// A turn opened. `deadline` is set when the ruleset has a time limit.
    Started {
        turn_id: usize,
        team_id: TeamId,
        deadline: Option<DateTime<Utc>>,
    },
    /// The turn's time limit ran out and a forced pass was applied.
    TimedOut { turn_id: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncKind {
    /// First snapshot after a match was created, restarted or loaded.
    Init,
    /// Snapshot after a state change.
    Sync,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncData {
    pub state: StateProjection,
    pub digest: StateDigest,
}

/// Authoritative snapshot pushed to clients and replicas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMessage {
    pub kind: SyncKind,
    pub data: SyncData,
}

impl SyncMessage {
    /// Snapshot of `state` carrying its last `window` turns.
    pub fn capture(
        kind: SyncKind,
        state: &game_core::GameState,
        window: usize,
    ) -> Result<Self, bincode::Error> {
        Ok(Self {
            kind,
            data: SyncData {
                state: StateProjection::new(state, window, None),
                digest: state.state_digest()?,
            },
        })
    }
}
