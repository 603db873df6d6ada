//! Deterministic tactics rules shared by server, clients and tooling.
//!
//! `game-core` defines the canonical rules (units, board, combat, actions,
//! turn lifecycle) and exposes pure APIs: no I/O, no clocks, no global
//! randomness. All state mutation flows through [`engine::GameEngine`], and
//! the runtime and tooling crates depend on the types re-exported here.
pub mod action;
pub mod audit;
pub mod board;
pub mod combat;
pub mod config;
pub mod engine;
pub mod error;
pub mod random;
pub mod state;
pub mod units;
pub mod view;

pub use action::{Action, ActionKind, ActionRequest, ValidationError};
pub use audit::{AuditReport, IntegrityError, audit_game, audit_team};
pub use board::{Board, BoardError, Direction, Position};
pub use combat::{DamageType, Luck, ResultKind, UnitChanges, UnitResult};
pub use config::{GameConfig, GameOptions};
pub use engine::{EngineError, GameEngine, UndoError, UndoPermission};
pub use error::{ErrorSeverity, GameError};
pub use random::{LuckDraw, RandomState};
pub use state::{
    ForkOrigin, GameState, JoinRequest, LifecycleError, Phase, SetUnit, Team, TeamId,
    TeamPosition, TeamSet, Turn, UndoMode, Winner,
};
pub use units::{StatusKind, Unit, UnitId, UnitKind, UnitStats};
pub use view::{RandomView, StateDigest, StateProjection, TeamView, TurnData, TurnDigest};
