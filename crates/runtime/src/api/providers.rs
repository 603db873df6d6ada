//! Asynchronous abstraction for sourcing team intent.
//!
//! Runtime users plug in [`ActionProvider`] implementations so a match can
//! run with human input, scripted fixtures, or bots. Whatever a provider
//! returns goes through the same validation as any other submission.
use async_trait::async_trait;
use game_core::{ActionRequest, StateProjection, TeamId};

use super::errors::Result;

/// Trait for providing a team's requests for its current turn.
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Requests for `team`, given the team-scoped projection of the match.
    ///
    /// The runtime submits them in order and stops at the first rejection.
    async fn provide_actions(
        &self,
        team: TeamId,
        state: &StateProjection,
    ) -> Result<Vec<ActionRequest>>;
}

/// Provider that always passes the turn.
/// Useful for testing or as a placeholder seat.
pub struct PassActionProvider;

#[async_trait]
impl ActionProvider for PassActionProvider {
    async fn provide_actions(
        &self,
        _team: TeamId,
        _state: &StateProjection,
    ) -> Result<Vec<ActionRequest>> {
        Ok(vec![ActionRequest::end_turn()])
    }
}
