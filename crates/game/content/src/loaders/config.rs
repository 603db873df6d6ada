//! Ruleset configuration loader.

use std::path::Path;

use game_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`GameConfig`] from TOML files.
///
/// Missing keys fall back to [`GameConfig::default`].
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)?;
        if config.board_width == 0 || config.board_height == 0 {
            anyhow::bail!(
                "board must be at least 1x1, got {}x{}",
                config.board_width,
                config.board_height
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse("turn_time_limit = 45\n").unwrap();
        assert_eq!(config.turn_time_limit, Some(45));
        assert_eq!(config.board_width, GameConfig::DEFAULT_BOARD_SIZE);
        assert_eq!(config.passed_turn_limit, GameConfig::DEFAULT_PASSED_TURN_LIMIT);
    }

    #[test]
    fn empty_board_is_rejected() {
        assert!(ConfigLoader::parse("board_width = 0\n").is_err());
    }
}
