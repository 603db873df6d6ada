//! Platform-specific directory utilities and match lookup
//!
//! Provides consistent directory paths across different operating systems,
//! following platform conventions for data directories.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use game_core::GameState;
use runtime::{FileGameRepository, GameRepository};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TACTICS_DATA_DIR";

/// Get the platform-specific directory holding persisted matches
///
/// Follows platform conventions:
/// - macOS: `~/Library/Application Support/tactics/games`
/// - Linux: `~/.local/share/tactics/games` (or `$XDG_DATA_HOME/tactics/games`)
/// - Windows: `%APPDATA%\tactics\games`
/// - Fallback: `./save_data/games`
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    directories::ProjectDirs::from("", "", "tactics")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
        .join("games")
}

/// List persisted match ids, newest first.
pub fn list_games(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut games = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read data directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let modified = entry.metadata()?.modified()?;
        games.push((id.to_string(), path.clone(), modified));
    }

    // Sort by modification time (newest first)
    games.sort_by(|a, b| b.2.cmp(&a.2));
    Ok(games.into_iter().map(|(id, path, _)| (id, path)).collect())
}

/// Arguments shared by commands that read one match.
#[derive(Args)]
pub struct GameSource {
    /// Match id (defaults to the most recently saved match)
    #[arg(value_name = "GAME_ID")]
    pub game_id: Option<String>,

    /// Custom data directory (defaults to $TACTICS_DATA_DIR or the platform location)
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Read a match file directly instead of looking it up by id
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["game_id", "data_dir"])]
    pub file: Option<PathBuf>,
}

impl GameSource {
    pub fn load(&self) -> Result<(GameState, PathBuf)> {
        if let Some(file) = &self.file {
            let bytes = std::fs::read(file)
                .with_context(|| format!("Failed to read match file: {}", file.display()))?;
            let state = serde_json::from_slice(&bytes)
                .with_context(|| format!("Failed to parse match file: {}", file.display()))?;
            return Ok((state, file.clone()));
        }

        let dir = self.data_dir.clone().unwrap_or_else(data_dir);
        let id = match &self.game_id {
            Some(id) => id.clone(),
            None => list_games(&dir)?
                .into_iter()
                .next()
                .map(|(id, _)| id)
                .with_context(|| format!("No matches found in {}", dir.display()))?,
        };

        let repository = FileGameRepository::new(&dir)
            .with_context(|| format!("Failed to open data directory: {}", dir.display()))?;
        let state = repository
            .load(&id)
            .with_context(|| format!("Failed to load match {id}"))?
            .with_context(|| format!("Match {id} not found in {}", dir.display()))?;
        Ok((state, dir.join(format!("{id}.json"))))
    }
}
