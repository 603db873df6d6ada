//! Content factory for loading a ruleset from a data directory.

use std::path::{Path, PathBuf};

use game_core::GameConfig;

use crate::loaders::{ConfigLoader, LoadResult, SetCatalog, SetLoader};

/// Content factory that loads all match content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── sets.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data directory bundled with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load ruleset configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load team sets from `sets.ron`, validated against `config`.
    pub fn load_sets(&self, config: &GameConfig) -> LoadResult<SetCatalog> {
        SetLoader::load(&self.data_dir.join("sets.ron"), config)
    }

    /// Load both files in dependency order.
    pub fn load_all(&self) -> LoadResult<(GameConfig, SetCatalog)> {
        let config = self.load_config()?;
        let sets = self.load_sets(&config)?;
        Ok((config, sets))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
