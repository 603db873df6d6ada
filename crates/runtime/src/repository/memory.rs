//! In-memory GameRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use game_core::GameState;

use super::{GameRepository, RepositoryError, Result};

#[derive(Default)]
pub struct InMemoryGameRepo {
    states: RwLock<HashMap<String, GameState>>,
}

impl InMemoryGameRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameRepository for InMemoryGameRepo {
    fn save(&self, state: &GameState) -> Result<()> {
        let mut states = self
            .states
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        states.insert(state.id.clone(), state.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<GameState>> {
        let states = self
            .states
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(states.get(id).cloned())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut states = self
            .states
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        states.remove(id);
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        let states = self
            .states
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut ids: Vec<String> = states.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> bool {
        self.states
            .read()
            .map(|states| states.contains_key(id))
            .unwrap_or(false)
    }
}
