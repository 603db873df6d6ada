//! Authoritative match state.
//!
//! [`GameState`] exclusively owns the board, teams and turn history. Runtime
//! layers clone or query it but mutate it only through
//! [`GameEngine`](crate::engine::GameEngine).

mod error;
mod team;
mod turn;

pub use error::LifecycleError;
pub use team::{JoinRequest, SetUnit, Team, TeamId, TeamPosition, TeamSet};
pub use turn::Turn;

use chrono::{DateTime, Utc};

use crate::action::{Action, ActionKind};
use crate::board::Board;
use crate::config::{GameConfig, GameOptions};
use crate::units::{Unit, UnitId};

/// How far back undo may reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase")]
pub enum UndoMode {
    /// Only the immediately preceding turn, with the opponent's approval.
    Strict,
    /// Back to the requester's latest turn, without approval.
    Loose,
}

/// Final outcome of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Winner {
    Team(TeamId),
    Draw,
    Truce,
}

/// Coarse lifecycle phase, derived from timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Pending,
    Active,
    Ended,
}

/// Canonical state of one match.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    pub id: String,
    /// Ruleset identifier.
    pub ruleset: String,
    /// One entry per slot; `None` until a player joins it.
    pub teams: Vec<Option<Team>>,
    pub board: Board,
    /// Sealed turn history; a turn's `id` is its index.
    pub turns: Vec<Turn>,
    /// Actions of the turn in progress.
    pub actions: Vec<Action>,
    pub started_at: Option<DateTime<Utc>>,
    pub turn_started_at: Option<DateTime<Utc>>,
    pub current_team_id: TeamId,
    pub ended_at: Option<DateTime<Utc>>,
    pub winner: Option<Winner>,
    pub undo_mode: Option<UndoMode>,
    pub random_hit_chance: bool,
    pub config: GameConfig,
    /// Board as it stood when the turn in progress opened.
    pub turn_units: Vec<Unit>,
    /// Set when this match was branched from another one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub forked_from: Option<ForkOrigin>,
}

/// Where a forked match branched off.
///
/// Turns before `turn_id` were recorded with the parent's random streams.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForkOrigin {
    pub game_id: String,
    pub turn_id: usize,
}

impl GameState {
    /// Creates a pending match with one empty slot per team.
    pub fn new(id: impl Into<String>, options: GameOptions) -> Result<Self, LifecycleError> {
        if options.team_count < 2 || options.team_count > GameConfig::MAX_TEAMS {
            return Err(LifecycleError::InvalidTeamCount {
                count: options.team_count,
                max: GameConfig::MAX_TEAMS,
            });
        }
        let config = options.config;
        let sides = 1..=GameConfig::MAX_BOARD_SIZE;
        if !sides.contains(&config.board_width) || !sides.contains(&config.board_height) {
            return Err(LifecycleError::InvalidBoardSize {
                width: config.board_width,
                height: config.board_height,
                max: GameConfig::MAX_BOARD_SIZE,
            });
        }
        Ok(Self {
            id: id.into(),
            ruleset: options.ruleset,
            teams: vec![None; options.team_count],
            board: Board::new(config.board_width, config.board_height),
            turns: Vec::new(),
            actions: Vec::new(),
            started_at: None,
            turn_started_at: None,
            current_team_id: TeamId(0),
            ended_at: None,
            winner: None,
            undo_mode: options.undo_mode,
            random_hit_chance: options.random_hit_chance,
            config,
            turn_units: Vec::new(),
            forked_from: None,
        })
    }

    // ===== lifecycle =====

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.is_ended() {
            Phase::Ended
        } else if self.is_started() {
            Phase::Active
        } else {
            Phase::Pending
        }
    }

    /// Id of the turn in progress.
    pub fn current_turn_id(&self) -> usize {
        self.turns.len()
    }

    // ===== teams =====

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(id.index()).and_then(Option::as_ref)
    }

    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn team_by_player(&self, player_id: &str) -> Option<&Team> {
        self.teams
            .iter()
            .flatten()
            .find(|team| team.player_id == player_id)
    }

    pub fn current_team(&self) -> Option<&Team> {
        self.team(self.current_team_id)
    }

    /// Teams that still have a living unit, in id order.
    pub fn capable_teams(&self) -> Vec<TeamId> {
        self.teams
            .iter()
            .flatten()
            .map(|team| team.id)
            .filter(|id| self.board.has_living_units(*id))
            .collect()
    }

    /// Whether chances resolved for `team` draw from its random stream.
    pub fn uses_luck(&self, team: TeamId) -> bool {
        self.random_hit_chance && self.team(team).is_some_and(|t| t.use_random)
    }

    // ===== turn in progress =====

    /// Unit that has acted this turn, if any.
    pub fn selected_unit(&self) -> Option<UnitId> {
        self.actions
            .iter()
            .filter(|action| action.kind.is_unit_action())
            .find_map(|action| action.unit)
    }

    pub fn has_moved(&self) -> bool {
        self.actions
            .iter()
            .any(|action| action.kind == ActionKind::Move)
    }

    pub fn has_attacked(&self) -> bool {
        self.actions.iter().any(|action| action.kind.is_attack())
    }

    /// Trailing run of sealed turns that were passed.
    pub fn passed_turns(&self) -> usize {
        self.turns
            .iter()
            .rev()
            .take_while(|turn| turn.is_pass())
            .count()
    }
}
