//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving the match or streaming events from specific topics.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{
    Action, ActionRequest, GameState, JoinRequest, StateProjection, TeamId, TurnData,
    UndoPermission, Winner,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Seats a player and returns the slot taken.
    ///
    /// Without a `seed` the worker seeds the team's stream from the OS
    /// generator.
    pub async fn join(
        &self,
        slot: Option<usize>,
        join: JoinRequest,
        seed: Option<u64>,
    ) -> Result<usize> {
        self.request(|reply| Command::Join {
            slot,
            join,
            seed,
            reply,
        })
        .await?
    }

    pub async fn start(&self, first_slot: Option<usize>) -> Result<()> {
        self.request(|reply| Command::Start { first_slot, reply })
            .await?
    }

    /// Submits one request for the current team.
    ///
    /// Returns every recorded action, including an implicit end of turn.
    pub async fn submit_action(&self, request: ActionRequest) -> Result<Vec<Action>> {
        self.submit_actions(vec![request]).await
    }

    /// Submits requests in order, stopping at the first rejection.
    pub async fn submit_actions(&self, requests: Vec<ActionRequest>) -> Result<Vec<Action>> {
        self.request(|reply| Command::Submit { requests, reply })
            .await?
    }

    /// Surrenders `team`. The reply also carries the forced `EndTurn` when
    /// the acting team gave up on its own turn.
    pub async fn surrender(&self, team: TeamId) -> Result<Vec<Action>> {
        self.request(|reply| Command::Surrender { team, reply })
            .await?
    }

    /// Undoes on behalf of `team` (the current team when `None`).
    pub async fn undo(&self, team: Option<TeamId>, approved: bool) -> Result<()> {
        self.request(|reply| Command::Undo {
            team,
            approved,
            reply,
        })
        .await?
    }

    pub async fn can_undo(&self, team: TeamId) -> Result<UndoPermission> {
        self.request(|reply| Command::CanUndo { team, reply }).await
    }

    pub async fn end(&self, winner: Winner) -> Result<()> {
        self.request(|reply| Command::End { winner, reply }).await?
    }

    /// Forces the end of `turn_id` as if its time limit ran out.
    ///
    /// Returns `None` when `turn_id` is no longer in progress.
    pub async fn force_timeout(&self, turn_id: usize) -> Result<Option<Action>> {
        self.request(|reply| Command::Timeout { turn_id, reply })
            .await?
    }

    /// Branches a new match from the opening of `turn_id`.
    ///
    /// The fork is returned, not hosted; build another runtime around it.
    pub async fn fork(&self, turn_id: usize, new_id: impl Into<String>) -> Result<GameState> {
        let new_id = new_id.into();
        self.request(|reply| Command::Fork {
            turn_id,
            new_id,
            reply,
        })
        .await?
    }

    /// Query the current game state (read-only snapshot)
    pub async fn query_state(&self) -> Result<GameState> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    /// Projection scoped to `player_id`'s team, with the runtime's sync window.
    pub async fn data_for_player(&self, player_id: impl Into<String>) -> Result<StateProjection> {
        let player_id = Some(player_id.into());
        self.request(|reply| Command::Projection { player_id, reply })
            .await
    }

    /// Spectator projection with the runtime's sync window.
    pub async fn spectate(&self) -> Result<StateProjection> {
        self.request(|reply| Command::Projection {
            player_id: None,
            reply,
        })
        .await
    }

    pub async fn turn_data(&self, turn_id: usize) -> Result<Option<TurnData>> {
        self.request(|reply| Command::TurnData { turn_id, reply })
            .await
    }

    /// Turn in progress and its deadline, `None` unless the match is active.
    pub async fn turn_deadline(&self) -> Result<Option<(usize, Option<DateTime<Utc>>)>> {
        self.request(|reply| Command::TurnDeadline { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::GameState` - Lifecycle changes, applied and rejected actions
    /// - `Topic::Turn` - Turn starts and timeouts
    /// - `Topic::Sync` - Authoritative snapshots with their digest
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
