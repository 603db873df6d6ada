//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod audit;
mod list;
mod read_state;
mod read_turns;

pub use audit::Audit;
pub use list::ListGames;
pub use read_state::ReadState;
pub use read_turns::ReadTurns;
