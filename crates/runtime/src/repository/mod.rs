//! Persistence of whole game states.
//!
//! A match is always saved as one JSON document keyed by its id; history,
//! random streams and the in-progress turn all live inside [`GameState`].
//!
//! [`GameState`]: game_core::GameState

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileGameRepository;
pub use memory::InMemoryGameRepo;
pub use traits::GameRepository;
