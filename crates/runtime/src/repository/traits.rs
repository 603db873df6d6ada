//! Repository contract for saving and loading matches.

use game_core::GameState;

use super::Result;

/// Repository for game state persistence, keyed by [`GameState::id`].
///
/// Saving overwrites whatever was stored under the same id.
pub trait GameRepository: Send + Sync {
    fn save(&self, state: &GameState) -> Result<()>;

    fn load(&self, id: &str) -> Result<Option<GameState>>;

    /// Deleting a missing id is not an error.
    fn delete(&self, id: &str) -> Result<()>;

    /// All stored ids, sorted.
    fn list_ids(&self) -> Result<Vec<String>>;

    fn exists(&self, id: &str) -> bool {
        matches!(self.load(id), Ok(Some(_)))
    }
}
