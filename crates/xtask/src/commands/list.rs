//! List persisted matches.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;

use runtime::{FileGameRepository, GameRepository};

use crate::dirs;

/// List persisted matches, newest first
#[derive(Parser)]
pub struct ListGames {
    /// Custom data directory (defaults to $TACTICS_DATA_DIR or the platform location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

impl ListGames {
    pub fn execute(self) -> Result<()> {
        let dir = self.data_dir.unwrap_or_else(dirs::data_dir);
        let games = dirs::list_games(&dir)?;
        println!("{} {}", style("Data Directory:").bold().cyan(), dir.display());

        if games.is_empty() {
            println!("No matches found.");
            return Ok(());
        }

        let repository = FileGameRepository::new(&dir)?;
        for (id, _) in games {
            match repository.load(&id) {
                Ok(Some(state)) => println!(
                    "  {:<24} {:<8} {:>4} turns  {}",
                    id,
                    state.phase(),
                    state.turns.len(),
                    state.ruleset
                ),
                Ok(None) => {}
                Err(err) => println!("  {:<24} {}", id, style(format!("unreadable: {err}")).red()),
            }
        }
        Ok(())
    }
}
