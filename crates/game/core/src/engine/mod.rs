//! Match state machine.
//!
//! The [`GameEngine`] is the only mutator of [`GameState`]. Every operation
//! either completes or leaves the state untouched: action results are
//! computed on scratch copies and committed afterwards, and undo restores
//! whole snapshots instead of inverting results.
//!
//! Time never comes from a clock here; callers pass `now`.

mod errors;
mod fork;
mod lifecycle;
mod turns;
mod undo;

pub use errors::{EngineError, UndoError};
pub use undo::UndoPermission;

use crate::state::GameState;

/// Authoritative reducer for one [`GameState`].
pub struct GameEngine<'a> {
    state: &'a mut GameState,
}

impl<'a> GameEngine<'a> {
    pub fn new(state: &'a mut GameState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &GameState {
        self.state
    }
}
