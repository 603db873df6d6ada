//! Runtime orchestration for authoritative tactics matches.
//!
//! This crate hosts one [`game_core::GameState`] per match inside a tokio
//! worker, and wires command channels, the turn timer, persistence and sync
//! snapshots around it. Consumers embed [`Runtime`] and talk to the match
//! through the cloneable [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus and sync snapshots
//! - [`protocol`] carries the request/reply command protocol and its host
//! - [`replica`] follows an authoritative match and detects desyncs
//! - [`repository`] persists whole game states
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod protocol;
pub mod replica;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{ActionProvider, PassActionProvider, Result, RuntimeError, RuntimeHandle};
pub use events::{Event, EventBus, GameStateEvent, SyncData, SyncKind, SyncMessage, Topic, TurnEvent};
pub use protocol::{
    CreateGame, ProtocolClient, ProtocolError, ProtocolHost, ReplyFault, Request, Response,
};
pub use replica::{DesyncError, Replica};
pub use repository::{FileGameRepository, GameRepository, InMemoryGameRepo, RepositoryError};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
