//! Combat resolution system.
//!
//! Pure arithmetic lives in [`hit`] and [`damage`]; [`Resolver`] drives a
//! single action against scratch copies of the board and random stream and
//! records the resulting [`UnitResult`] transcript.
//!
//! # Core Functions
//!
//! - `calculate_hit_chance`: block percentage adjusted by approach side
//! - `calculate_damage`: armor-scaled physical or raw magic damage
//! - `apply_damage`: clamps overkill to exactly lethal

pub mod damage;
pub mod hit;
mod resolver;
pub mod result;

pub use damage::{DamageType, apply_damage, apply_heal, calculate_damage};
pub use hit::{calculate_hit_chance, check_hit, effective_block};
pub use resolver::{Resolution, Resolver};
pub use result::{Luck, ResultKind, UnitChanges, UnitResult};
