//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command/event channels, and
//! exposes a builder-based API for clients to drive a match.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use game_content::ContentFactory;
use game_core::{EngineError, GameOptions, GameState, Phase, TeamId};

use crate::api::{ActionProvider, Result, RuntimeError, RuntimeHandle};
use crate::events::{EventBus, Topic};
use crate::repository::GameRepository;
use crate::workers::{Command, GameWorker, TurnTimer};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Recent turns carried by sync snapshots and projections. Defaults to the
    /// match's `recent_turn_window`.
    pub recent_turns: Option<usize>,
    /// Spawn the turn timer that closes turns whose time limit ran out.
    pub enable_turn_timer: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            command_buffer_size: 32,
            recent_turns: None,
            enable_turn_timer: true,
        }
    }
}

/// Main runtime that hosts one authoritative match.
///
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,

    // Seats driven by providers (bots, scripted fixtures)
    providers: HashMap<TeamId, Box<dyn ActionProvider>>,

    worker_handle: JoinHandle<()>,
    timer_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Lets the provider seated for the current team play its turn.
    ///
    /// Returns `false` without doing anything when the match is not active.
    pub async fn step(&mut self) -> Result<bool> {
        let state = self.handle.query_state().await?;
        if state.phase() != Phase::Active {
            return Ok(false);
        }

        let team = state.current_team_id;
        let provider = self
            .providers
            .get(&team)
            .ok_or(RuntimeError::ProviderNotSet { team })?;
        let player_id = state
            .team(team)
            .map(|seat| seat.player_id.clone())
            .unwrap_or_default();

        let projection = self.handle.data_for_player(player_id).await?;
        let requests = provider.provide_actions(team, &projection).await?;
        debug!(target: "runtime", %team, requests = requests.len(), "provider answered");

        self.handle.submit_actions(requests).await?;
        Ok(true)
    }

    /// Steps until the match ends.
    pub async fn run(&mut self) -> Result<()> {
        while self.step().await? {}
        Ok(())
    }

    /// Seats a provider for `team`, replacing any previous one.
    pub fn set_provider(&mut self, team: TeamId, provider: impl ActionProvider + 'static) {
        self.providers.insert(team, Box::new(provider));
    }

    /// Shutdown the runtime gracefully
    ///
    /// Waits for the game worker to drain its queue. Other clones of the
    /// handle must be dropped first.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)?;

        if let Some(timer) = self.timer_handle {
            timer.abort();
            match timer.await {
                Ok(()) => {}
                Err(err) if err.is_cancelled() => {}
                Err(err) => return Err(RuntimeError::WorkerJoin(err)),
            }
        }

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    state: Option<GameState>,
    new_game: Option<(String, GameOptions)>,
    resume: Option<String>,
    content: Option<ContentFactory>,
    repository: Option<Arc<dyn GameRepository>>,
    providers: HashMap<TeamId, Box<dyn ActionProvider>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            state: None,
            new_game: None,
            resume: None,
            content: None,
            repository: None,
            providers: HashMap::new(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Host an existing match as-is.
    pub fn initial_state(mut self, state: GameState) -> Self {
        self.state = Some(state);
        self
    }

    /// Create a fresh match.
    pub fn new_game(mut self, id: impl Into<String>, options: GameOptions) -> Self {
        self.new_game = Some((id.into(), options));
        self
    }

    /// Load the match `id` from the repository at build time.
    pub fn resume(mut self, id: impl Into<String>) -> Self {
        self.resume = Some(id.into());
        self
    }

    /// Use the ruleset configuration from a content directory for new games.
    pub fn content(mut self, factory: ContentFactory) -> Self {
        self.content = Some(factory);
        self
    }

    /// Persist every change (and resolve [`resume`](Self::resume)) through
    /// `repository`.
    pub fn repository(mut self, repository: Arc<dyn GameRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn provider(mut self, team: TeamId, provider: impl ActionProvider + 'static) -> Self {
        self.providers.insert(team, Box::new(provider));
        self
    }

    fn initial(&mut self) -> Result<GameState> {
        if let Some(state) = self.state.take() {
            return Ok(state);
        }

        if let Some(id) = self.resume.take() {
            let repository = self.repository.as_ref().ok_or(RuntimeError::MissingState)?;
            return repository.load(&id)?.ok_or(RuntimeError::MissingState);
        }

        let (id, mut options) = self.new_game.take().ok_or(RuntimeError::MissingState)?;
        if let Some(factory) = &self.content {
            options.config = factory
                .load_config()
                .map_err(|err| RuntimeError::Content(format!("{err:#}")))?;
        }
        GameState::new(id, options).map_err(|err| RuntimeError::Engine(EngineError::from(err)))
    }

    /// Build the runtime
    pub async fn build(mut self) -> Result<Runtime> {
        let state = self.initial()?;
        let sync_window = self
            .config
            .recent_turns
            .unwrap_or(state.config.recent_turn_window);

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        // The timer must subscribe before the worker announces the first turn.
        let timer_handle = if self.config.enable_turn_timer {
            let timer = TurnTimer::new(event_bus.subscribe(Topic::Turn), command_tx.downgrade());
            Some(tokio::spawn(timer.run()))
        } else {
            None
        };

        info!(
            target: "runtime",
            game_id = %state.id,
            sync_window,
            turn_timer = self.config.enable_turn_timer,
            persistent = self.repository.is_some(),
            "starting runtime"
        );

        let worker = GameWorker::new(
            state,
            command_rx,
            event_bus.clone(),
            self.repository,
            sync_window,
        );
        let worker_handle = tokio::spawn(worker.run());

        Ok(Runtime {
            handle: RuntimeHandle::new(command_tx, event_bus),
            providers: self.providers,
            worker_handle,
            timer_handle,
        })
    }
}
