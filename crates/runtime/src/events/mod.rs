//! Topic-based event bus for runtime events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need. Sync snapshots for clients and replicas travel on
//! their own topic so they never crowd out turn bookkeeping.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{GameStateEvent, SyncData, SyncKind, SyncMessage, TurnEvent};
