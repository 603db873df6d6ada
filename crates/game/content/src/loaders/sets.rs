//! Team set (starting roster) catalog loader.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use game_core::{GameConfig, Position, TeamSet};

use crate::loaders::{LoadResult, read_file};

/// Named rosters available to joining players.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SetCatalog {
    sets: BTreeMap<String, TeamSet>,
}

impl SetCatalog {
    pub fn get(&self, name: &str) -> Option<&TeamSet> {
        self.sets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Loader for team sets from RON files.
pub struct SetLoader;

impl SetLoader {
    /// Load a set catalog and check every roster fits `config`'s board.
    ///
    /// RON format: `Vec<TeamSet>`, each roster expressed for the south side.
    pub fn load(path: &Path, config: &GameConfig) -> LoadResult<SetCatalog> {
        let content = read_file(path)?;
        Self::parse(&content, config)
            .map_err(|e| anyhow::anyhow!("Failed to load team sets {}: {}", path.display(), e))
    }

    pub fn parse(content: &str, config: &GameConfig) -> LoadResult<SetCatalog> {
        let raw: Vec<TeamSet> = ron::from_str(content)?;

        let mut sets = BTreeMap::new();
        for set in raw {
            validate(&set, config)?;
            let name = set.name.clone();
            if sets.insert(name.clone(), set).is_some() {
                anyhow::bail!("duplicate team set '{}'", name);
            }
        }
        Ok(SetCatalog { sets })
    }
}

fn validate(set: &TeamSet, config: &GameConfig) -> LoadResult<()> {
    if set.units.is_empty() {
        anyhow::bail!("team set '{}' has no units", set.name);
    }
    let mut seen: HashSet<Position> = HashSet::new();
    for entry in &set.units {
        let tile = entry.position;
        let inside = tile.x >= 0
            && tile.y >= 0
            && (tile.x as u32) < config.board_width
            && (tile.y as u32) < config.board_height;
        if !inside {
            anyhow::bail!("team set '{}': {} is off the board", set.name, tile);
        }
        if !seen.insert(tile) {
            anyhow::bail!("team set '{}': {} is used twice", set.name, tile);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::UnitKind;

    const SETS: &str = r#"[
        (
            name: "pair",
            units: [
                (kind: Knight, position: (x: 4, y: 9)),
                (kind: Cleric, position: (x: 5, y: 10), direction: East),
            ],
        ),
    ]"#;

    #[test]
    fn parses_rosters_with_default_facing() {
        let catalog = SetLoader::parse(SETS, &GameConfig::default()).unwrap();
        let pair = catalog.get("pair").unwrap();
        assert_eq!(pair.units[0].kind, UnitKind::Knight);
        assert_eq!(pair.units[0].direction, game_core::Direction::North);
        assert_eq!(pair.units[1].direction, game_core::Direction::East);
    }

    #[test]
    fn rejects_rosters_off_a_small_board() {
        let config = GameConfig::default().with_board_size(6, 6);
        assert!(SetLoader::parse(SETS, &config).is_err());
    }

    #[test]
    fn rejects_duplicate_tiles() {
        let sets = r#"[(name: "bad", units: [
            (kind: Knight, position: (x: 1, y: 1)),
            (kind: Scout, position: (x: 1, y: 1)),
        ])]"#;
        assert!(SetLoader::parse(sets, &GameConfig::default()).is_err());
    }
}
