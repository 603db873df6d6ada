//! Data-driven content definitions and loaders.
//!
//! This crate houses static match content and loaders for its data files:
//! - Ruleset configuration (board size, timers, draw limits) via TOML
//! - Team sets (named starting rosters) via RON
//!
//! Content is consumed when a match is created or a team joins; it never
//! appears in game state except as the roster snapshot a team joined with.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, SetCatalog, SetLoader};
