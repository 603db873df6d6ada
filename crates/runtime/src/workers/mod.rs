//! Worker tasks that back the runtime orchestration.
//!
//! The game worker owns the authoritative match, while the turn timer turns
//! expired deadlines into timeout commands.

mod game;
mod timer;

pub use game::{Command, GameWorker};
pub use timer::TurnTimer;
