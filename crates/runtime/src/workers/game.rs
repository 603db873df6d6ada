//! Game worker that owns the authoritative [`game_core::GameState`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), drives the
//! match through [`GameEngine`], persists every change, and publishes events
//! plus a sync snapshot to the [`EventBus`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use game_core::{
    Action, ActionRequest, EngineError, GameEngine, GameError, GameState, JoinRequest, Phase,
    StateProjection, TeamId, TurnData, UndoPermission, Winner,
};

use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus, GameStateEvent, SyncKind, SyncMessage, TurnEvent};
use crate::repository::GameRepository;

/// Commands that can be sent to the game worker.
pub enum Command {
    Join {
        slot: Option<usize>,
        join: JoinRequest,
        /// Random stream seed; drawn from the OS generator when `None`.
        seed: Option<u64>,
        reply: oneshot::Sender<Result<usize>>,
    },
    Start {
        first_slot: Option<usize>,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Applies requests in order, stopping at the first rejection.
    Submit {
        requests: Vec<ActionRequest>,
        reply: oneshot::Sender<Result<Vec<Action>>>,
    },
    Surrender {
        team: TeamId,
        reply: oneshot::Sender<Result<Vec<Action>>>,
    },
    Undo {
        team: Option<TeamId>,
        approved: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    CanUndo {
        team: TeamId,
        reply: oneshot::Sender<UndoPermission>,
    },
    End {
        winner: Winner,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Turn `turn_id` ran out of time. Stale ids are ignored.
    Timeout {
        turn_id: usize,
        reply: oneshot::Sender<Result<Option<Action>>>,
    },
    Fork {
        turn_id: usize,
        new_id: String,
        reply: oneshot::Sender<Result<GameState>>,
    },
    QueryState {
        reply: oneshot::Sender<GameState>,
    },
    /// Projection for `player_id`, or the spectator projection when `None`.
    Projection {
        player_id: Option<String>,
        reply: oneshot::Sender<StateProjection>,
    },
    TurnData {
        turn_id: usize,
        reply: oneshot::Sender<Option<TurnData>>,
    },
    /// Turn in progress and its deadline, `None` unless the match is active.
    TurnDeadline {
        reply: oneshot::Sender<Option<(usize, Option<DateTime<Utc>>)>>,
    },
}

/// Background task that processes match commands.
pub struct GameWorker {
    state: GameState,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    repository: Option<Arc<dyn GameRepository>>,
    sync_window: usize,
    /// Last announced turn, phase and turn clock start.
    announced: Option<(usize, Phase, Option<DateTime<Utc>>)>,
}

impl GameWorker {
    pub fn new(
        state: GameState,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        repository: Option<Arc<dyn GameRepository>>,
        sync_window: usize,
    ) -> Self {
        info!(
            target: "runtime::worker",
            game_id = %state.id,
            phase = ?state.phase(),
            turns = state.turns.len(),
            "game worker initialized"
        );

        Self {
            state,
            command_rx,
            event_bus,
            repository,
            sync_window,
            announced: None,
        }
    }

    /// Main worker loop. Exits once every command sender is dropped.
    pub async fn run(mut self) {
        self.publish_sync(SyncKind::Init);
        self.announce_turn();

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
        }

        debug!(target: "runtime::worker", game_id = %self.state.id, "command channel closed");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Join {
                slot,
                join,
                seed,
                reply,
            } => {
                let player_id = join.player_id.clone();
                let seed = seed.unwrap_or_else(rand::random);
                let result = GameEngine::new(&mut self.state)
                    .join(slot, join, seed)
                    .map_err(EngineError::from);
                let result = self.conclude(result, |slot| {
                    vec![GameStateEvent::TeamJoined {
                        slot: *slot,
                        player_id,
                    }]
                });
                respond(reply, result, "Join");
            }
            Command::Start { first_slot, reply } => {
                let result = GameEngine::new(&mut self.state)
                    .start(Utc::now(), first_slot)
                    .map_err(EngineError::from);
                let game_id = self.state.id.clone();
                let result =
                    self.conclude(result, |_| vec![GameStateEvent::Started { game_id }]);
                respond(reply, result, "Start");
            }
            Command::Submit { requests, reply } => {
                let result = self.submit(&requests);
                respond(reply, result, "Submit");
            }
            Command::Surrender { team, reply } => {
                let result = GameEngine::new(&mut self.state).surrender(team, Utc::now());
                let result = self.conclude(result, |actions| {
                    vec![GameStateEvent::ActionsApplied {
                        actions: actions.clone(),
                    }]
                });
                respond(reply, result, "Surrender");
            }
            Command::Undo {
                team,
                approved,
                reply,
            } => {
                let team = team.unwrap_or(self.state.current_team_id);
                let result = GameEngine::new(&mut self.state)
                    .undo(Some(team), approved, Utc::now())
                    .map_err(EngineError::from);
                let result = self.conclude(result, |_| vec![GameStateEvent::Undone { team }]);
                respond(reply, result, "Undo");
            }
            Command::CanUndo { team, reply } => {
                respond(reply, self.state.can_undo(team), "CanUndo");
            }
            Command::End { winner, reply } => {
                let result = GameEngine::new(&mut self.state)
                    .end(winner, Utc::now())
                    .map_err(EngineError::from);
                let result = self.conclude(result, |_| Vec::new());
                respond(reply, result, "End");
            }
            Command::Timeout { turn_id, reply } => {
                let result = GameEngine::new(&mut self.state).force_timeout(turn_id, Utc::now());
                let result = match result {
                    Ok(None) => {
                        debug!(target: "runtime::worker", turn_id, "ignoring stale timeout");
                        if self.state.phase() == Phase::Active
                            && turn_id == self.state.current_turn_id()
                        {
                            // Early for the turn in progress: re-arm the timer.
                            self.announced = None;
                            self.announce_turn();
                        }
                        Ok(None)
                    }
                    other => self.conclude(other, |action| match action {
                        Some(action) => {
                            info!(target: "runtime::worker", turn_id, "turn timed out");
                            vec![GameStateEvent::ActionsApplied {
                                actions: vec![action.clone()],
                            }]
                        }
                        None => Vec::new(),
                    }),
                };
                if matches!(result, Ok(Some(_))) {
                    self.event_bus
                        .publish(Event::Turn(TurnEvent::TimedOut { turn_id }));
                }
                respond(reply, result, "Timeout");
            }
            Command::Fork {
                turn_id,
                new_id,
                reply,
            } => {
                let seeds: Vec<u64> = (0..self.state.teams.len())
                    .map(|_| rand::random())
                    .collect();
                let result = self
                    .state
                    .fork(turn_id, new_id, &seeds, Utc::now())
                    .map_err(|err| RuntimeError::Engine(err.into()));
                respond(reply, result, "Fork");
            }
            Command::QueryState { reply } => {
                respond(reply, self.state.clone(), "QueryState");
            }
            Command::Projection { player_id, reply } => {
                let viewer = player_id
                    .as_deref()
                    .and_then(|id| self.state.team_by_player(id))
                    .map(|team| team.id);
                let projection = StateProjection::new(&self.state, self.sync_window, viewer);
                respond(reply, projection, "Projection");
            }
            Command::TurnData { turn_id, reply } => {
                respond(reply, self.state.get_turn_data(turn_id), "TurnData");
            }
            Command::TurnDeadline { reply } => {
                let current = (self.state.phase() == Phase::Active).then(|| {
                    let turn_id = self.state.current_turn_id();
                    (turn_id, self.state.get_turn_time_limit(turn_id))
                });
                respond(reply, current, "TurnDeadline");
            }
        }
    }

    /// Submits requests one at a time so that actions accepted before a
    /// rejection are still announced.
    fn submit(&mut self, requests: &[ActionRequest]) -> Result<Vec<Action>> {
        let now = Utc::now();
        let mut applied = Vec::new();
        let mut failure = None;
        {
            let mut engine = GameEngine::new(&mut self.state);
            for request in requests {
                match engine.submit_action(request, now) {
                    Ok(actions) => applied.extend(actions),
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }
        }

        let mut events = Vec::new();
        if !applied.is_empty() {
            events.push(GameStateEvent::ActionsApplied {
                actions: applied.clone(),
            });
        }
        if let Some(err) = &failure {
            log_rejection(err, "action rejected");
            events.push(GameStateEvent::ActionRejected {
                code: err.error_code().to_string(),
                message: err.to_string(),
            });
        }
        if !applied.is_empty() || failure.is_some() {
            self.after_change(events, !applied.is_empty());
        }

        match failure {
            Some(err) => Err(err.into()),
            None => Ok(applied),
        }
    }

    /// Publishes the outcome of a single engine call.
    fn conclude<T>(
        &mut self,
        result: std::result::Result<T, EngineError>,
        events: impl FnOnce(&T) -> Vec<GameStateEvent>,
    ) -> Result<T> {
        match result {
            Ok(value) => {
                let events = events(&value);
                self.after_change(events, true);
                Ok(value)
            }
            Err(err) => {
                log_rejection(&err, "command rejected");
                Err(err.into())
            }
        }
    }

    fn after_change(&mut self, events: Vec<GameStateEvent>, changed: bool) {
        let was_ended = matches!(self.announced, Some((_, Phase::Ended, _)));
        for event in events {
            self.event_bus.publish(Event::GameState(event));
        }
        if !changed {
            return;
        }

        if !was_ended && self.state.is_ended() {
            if let Some(winner) = self.state.winner {
                info!(target: "runtime::worker", game_id = %self.state.id, ?winner, "game ended");
                self.event_bus
                    .publish(Event::GameState(GameStateEvent::Ended { winner }));
            }
        }
        self.announce_turn();
        self.persist();
        self.publish_sync(SyncKind::Sync);
    }

    /// Publishes [`TurnEvent::Started`] whenever the turn in progress changed
    /// or its clock restarted after an undo.
    fn announce_turn(&mut self) {
        let current = (
            self.state.current_turn_id(),
            self.state.phase(),
            self.state.turn_started_at,
        );
        if self.announced == Some(current) {
            return;
        }
        self.announced = Some(current);
        if current.1 != Phase::Active {
            return;
        }

        let (turn_id, _, _) = current;
        let deadline = self.state.get_turn_time_limit(turn_id);
        debug!(
            target: "runtime::worker",
            turn_id,
            team = %self.state.current_team_id,
            ?deadline,
            "turn started"
        );
        self.event_bus.publish(Event::Turn(TurnEvent::Started {
            turn_id,
            team_id: self.state.current_team_id,
            deadline,
        }));
    }

    fn persist(&self) {
        let Some(repository) = &self.repository else {
            return;
        };
        if let Err(err) = repository.save(&self.state) {
            error!(
                target: "runtime::worker",
                game_id = %self.state.id,
                error = %err,
                "failed to persist game state"
            );
        }
    }

    fn publish_sync(&self, kind: SyncKind) {
        match SyncMessage::capture(kind, &self.state, self.sync_window) {
            Ok(message) => self.event_bus.publish(Event::Sync(message)),
            Err(err) => error!(
                target: "runtime::worker",
                game_id = %self.state.id,
                error = %err,
                "failed to capture sync snapshot"
            ),
        }
    }
}

/// Logs a refused engine call at `error!` when internal or fatal, `debug!`
/// otherwise.
fn log_rejection(err: &EngineError, message: &'static str) {
    let severity = err.severity();
    if severity.is_internal() {
        error!(
            target: "runtime::worker",
            code = err.error_code(),
            severity = severity.as_str(),
            error = %err,
            "{message}"
        );
    } else {
        debug!(
            target: "runtime::worker",
            code = err.error_code(),
            severity = severity.as_str(),
            error = %err,
            "{message}"
        );
    }
}

fn respond<T>(reply: oneshot::Sender<T>, value: T, command: &'static str) {
    if reply.send(value).is_err() {
        debug!(target: "runtime::worker", command, "reply channel closed (caller dropped)");
    }
}
