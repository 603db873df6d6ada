//! File-based GameRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use game_core::GameState;

use super::{GameRepository, RepositoryError, Result};

/// Stores each match as `{id}.json` under a base directory.
///
/// JSON keeps dates as RFC 3339 strings and preserves the order of turns,
/// actions and results. Writes go to a temp file first and are renamed into
/// place, so a crash never leaves a half-written match behind.
pub struct FileGameRepository {
    base_dir: PathBuf,
}

impl FileGameRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn state_path(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(RepositoryError::InvalidId(id.to_string()));
        }
        Ok(self.base_dir.join(format!("{id}.json")))
    }
}

impl GameRepository for FileGameRepository {
    fn save(&self, state: &GameState) -> Result<()> {
        let path = self.state_path(&state.id)?;
        let temp_path = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(state)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(
            target: "runtime::repository",
            game_id = %state.id,
            path = %path.display(),
            "saved game state"
        );
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<GameState>> {
        let path = self.state_path(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        let state: GameState = serde_json::from_slice(&bytes)?;
        Ok(Some(state))
    }

    fn delete(&self, id: &str) -> Result<()> {
        let path = self.state_path(id)?;
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!(target: "runtime::repository", game_id = %id, "deleted game state");
        }
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> bool {
        self.state_path(id).map(|path| path.exists()).unwrap_or(false)
    }
}
