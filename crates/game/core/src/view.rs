//! Read-only views over [`GameState`].
//!
//! Clients and replicas never see the full state. They receive a
//! [`StateProjection`]: team metadata without random generators (until the
//! match ends), the live board, and a window of the most recent turns.

use chrono::{DateTime, Duration, Utc};
use rand_pcg::Pcg32;

use crate::action::Action;
use crate::board::Board;
use crate::state::{GameState, Phase, Team, TeamId, TeamPosition, UndoMode, Winner};
use crate::units::Unit;

/// One turn's opening snapshot and recorded actions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnData {
    pub id: usize,
    pub team_id: TeamId,
    pub started_at: Option<DateTime<Utc>>,
    pub units: Vec<Unit>,
    pub actions: Vec<Action>,
}

impl GameState {
    /// Opening units and actions of `turn_id`, sealed or in progress.
    pub fn get_turn_data(&self, turn_id: usize) -> Option<TurnData> {
        if let Some(turn) = self.turns.get(turn_id) {
            return Some(TurnData {
                id: turn.id,
                team_id: turn.team_id,
                started_at: Some(turn.started_at),
                units: turn.units.clone(),
                actions: turn.actions.clone(),
            });
        }
        if self.is_started() && !self.is_ended() && turn_id == self.current_turn_id() {
            return Some(TurnData {
                id: turn_id,
                team_id: self.current_team_id,
                started_at: self.turn_started_at,
                units: self.turn_units.clone(),
                actions: self.actions.clone(),
            });
        }
        None
    }

    pub fn get_turn_actions(&self, turn_id: usize) -> Option<&[Action]> {
        match self.turns.get(turn_id) {
            Some(turn) => Some(&turn.actions),
            None if self.is_started() && turn_id == self.current_turn_id() => {
                Some(&self.actions)
            }
            None => None,
        }
    }

    /// Deadline of the turn in progress, when a time limit is configured.
    ///
    /// Returns `None` for sealed turns, finished matches, or untimed rulesets.
    pub fn get_turn_time_limit(&self, turn_id: usize) -> Option<DateTime<Utc>> {
        if self.phase() != Phase::Active || turn_id != self.current_turn_id() {
            return None;
        }
        let seconds = self.config.turn_time_limit?;
        Some(self.turn_started_at? + Duration::seconds(i64::from(seconds)))
    }

    /// Projection scoped to the team seated by `player_id`, if any.
    pub fn get_data_for_player(&self, player_id: &str) -> StateProjection {
        let viewer = self.team_by_player(player_id).map(|team| team.id);
        StateProjection::new(self, self.config.recent_turn_window, viewer)
    }
}

/// Public part of a team's random stream.
///
/// The starting generator is withheld while the match runs; publishing it
/// would let anyone predict every future roll.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomView {
    pub count: u32,
    pub initial: Option<Pcg32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamView {
    pub id: TeamId,
    pub slot: usize,
    pub player_id: String,
    pub name: String,
    pub color_id: u8,
    pub position: TeamPosition,
    pub use_random: bool,
    pub random: RandomView,
}

impl TeamView {
    fn new(team: &Team, reveal: bool) -> Self {
        Self {
            id: team.id,
            slot: team.slot,
            player_id: team.player_id.clone(),
            name: team.name.clone(),
            color_id: team.color_id,
            position: team.position,
            use_random: team.use_random,
            random: RandomView {
                count: team.random_state.count(),
                initial: reveal.then(|| team.random_state.initial().clone()),
            },
        }
    }
}

/// A sealed turn as carried by a projection.
///
/// Only the first and last turns of the window carry their opening units;
/// the rest are trimmed to their actions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnDigest {
    pub id: usize,
    pub team_id: TeamId,
    pub started_at: DateTime<Utc>,
    pub is_first: bool,
    pub is_last: bool,
    pub full_detail: bool,
    pub units: Option<Vec<Unit>>,
    pub actions: Vec<Action>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateProjection {
    pub id: String,
    pub ruleset: String,
    pub phase: Phase,
    /// Team the projection was built for, `None` for spectators.
    pub viewer: Option<TeamId>,
    pub teams: Vec<Option<TeamView>>,
    pub board: Board,
    pub turn_count: usize,
    pub recent_turns: Vec<TurnDigest>,
    pub actions: Vec<Action>,
    pub started_at: Option<DateTime<Utc>>,
    pub turn_started_at: Option<DateTime<Utc>>,
    pub turn_ends_at: Option<DateTime<Utc>>,
    pub current_team_id: TeamId,
    pub ended_at: Option<DateTime<Utc>>,
    pub winner: Option<Winner>,
    pub undo_mode: Option<UndoMode>,
    pub random_hit_chance: bool,
}

impl StateProjection {
    /// Builds a projection carrying the last `window` sealed turns.
    pub fn new(state: &GameState, window: usize, viewer: Option<TeamId>) -> Self {
        let reveal = state.is_ended();
        let start = state.turns.len().saturating_sub(window);
        let recent = &state.turns[start..];
        let last = recent.len().saturating_sub(1);

        let recent_turns = recent
            .iter()
            .enumerate()
            .map(|(index, turn)| {
                let is_first = index == 0;
                let is_last = index == last;
                let full_detail = is_first || is_last;
                TurnDigest {
                    id: turn.id,
                    team_id: turn.team_id,
                    started_at: turn.started_at,
                    is_first,
                    is_last,
                    full_detail,
                    units: full_detail.then(|| turn.units.clone()),
                    actions: turn.actions.clone(),
                }
            })
            .collect();

        Self {
            id: state.id.clone(),
            ruleset: state.ruleset.clone(),
            phase: state.phase(),
            viewer,
            teams: state
                .teams
                .iter()
                .map(|slot| slot.as_ref().map(|team| TeamView::new(team, reveal)))
                .collect(),
            board: state.board.clone(),
            turn_count: state.turns.len(),
            recent_turns,
            actions: state.actions.clone(),
            started_at: state.started_at,
            turn_started_at: state.turn_started_at,
            turn_ends_at: state.get_turn_time_limit(state.current_turn_id()),
            current_team_id: state.current_team_id,
            ended_at: state.ended_at,
            winner: state.winner,
            undo_mode: state.undo_mode,
            random_hit_chance: state.random_hit_chance,
        }
    }
}

/// SHA-256 of a state's canonical spectator projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateDigest(pub [u8; 32]);

#[cfg(feature = "serde")]
impl std::fmt::Display for StateDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[cfg(feature = "serde")]
impl GameState {
    /// Digest of everything a replica is expected to agree on.
    ///
    /// Two states with equal digests project identically to spectators.
    pub fn state_digest(&self) -> Result<StateDigest, bincode::Error> {
        use sha2::{Digest, Sha256};

        let projection = StateProjection::new(self, self.config.recent_turn_window, None);
        let bytes = bincode::serialize(&projection)?;
        Ok(StateDigest(Sha256::digest(&bytes).into()))
    }
}
