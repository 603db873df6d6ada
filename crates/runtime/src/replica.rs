//! Follower copy of a match that detects divergence from the authority.
//!
//! A [`Replica`] holds a full [`GameState`] obtained from the authority and
//! may apply requests to it speculatively. Every authoritative snapshot is
//! checked against the local digest. On a mismatch the local state is
//! discarded and must be replaced wholesale; it is never patched.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error};

use game_core::{Action, ActionRequest, GameEngine, GameState, StateDigest};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{SyncData, SyncMessage};

#[derive(Debug, Error)]
pub enum DesyncError {
    #[error("local state digest {local} diverged from authoritative digest {expected}")]
    Diverged {
        expected: StateDigest,
        local: StateDigest,
    },

    #[error("replica holds no local state; resync required")]
    NotSynced,

    #[error("failed to compute local digest: {0}")]
    Digest(#[from] bincode::Error),
}

#[derive(Default)]
pub struct Replica {
    local: Option<GameState>,
    latest: Option<SyncData>,
}

impl Replica {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replica seeded with a full authoritative state.
    pub fn from_state(state: GameState) -> Self {
        let mut replica = Self::new();
        replica.resync(state);
        replica
    }

    pub fn local(&self) -> Option<&GameState> {
        self.local.as_ref()
    }

    /// Most recent authoritative snapshot seen.
    pub fn latest(&self) -> Option<&SyncData> {
        self.latest.as_ref()
    }

    pub fn is_synced(&self) -> bool {
        self.local.is_some()
    }

    /// Replaces the local state with an authoritative copy.
    pub fn resync(&mut self, state: GameState) {
        debug!(target: "runtime::replica", game_id = %state.id, turns = state.turns.len(), "replica resynced");
        self.local = Some(state);
    }

    /// Fetches the authoritative state from a runtime and resyncs.
    pub async fn resync_from(&mut self, handle: &RuntimeHandle) -> Result<()> {
        let state = handle.query_state().await?;
        self.resync(state);
        Ok(())
    }

    /// Checks an authoritative snapshot against the local state.
    ///
    /// On divergence the local state is dropped and the error is returned;
    /// call [`resync`](Self::resync) before predicting again.
    pub fn apply_sync(&mut self, message: &SyncMessage) -> std::result::Result<(), DesyncError> {
        let expected = message.data.digest;
        self.latest = Some(message.data.clone());

        let Some(local) = self.local.as_ref() else {
            return Err(DesyncError::NotSynced);
        };
        let local_digest = match local.state_digest() {
            Ok(digest) => digest,
            Err(err) => {
                self.local = None;
                return Err(err.into());
            }
        };

        if local_digest != expected {
            error!(
                target: "runtime::replica",
                game_id = %local.id,
                %expected,
                local = %local_digest,
                "replica diverged from authority, discarding local state"
            );
            self.local = None;
            return Err(DesyncError::Diverged {
                expected,
                local: local_digest,
            });
        }
        Ok(())
    }

    /// Applies requests to the local state ahead of the authority.
    ///
    /// The results are provisional until the next snapshot confirms them.
    pub fn predict(&mut self, requests: &[ActionRequest], now: DateTime<Utc>) -> Result<Vec<Action>> {
        let local = self
            .local
            .as_mut()
            .ok_or(RuntimeError::Desync(DesyncError::NotSynced))?;
        Ok(GameEngine::new(local).submit_actions(requests, now)?)
    }
}
