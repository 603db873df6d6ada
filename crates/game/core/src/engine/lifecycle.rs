use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::action::{self, Action, ActionRequest, ValidationError};
use crate::board::Board;
use crate::state::{JoinRequest, LifecycleError, Team, TeamId, TeamPosition, Turn, Winner};
use crate::units::{Unit, UnitId};

use super::{EngineError, GameEngine};

/// Join, start, surrender and end.
impl<'a> GameEngine<'a> {
    /// Seats a player. Picks the first open slot when `slot` is `None`.
    ///
    /// `seed` initializes the team's random stream; it is never re-seeded.
    pub fn join(
        &mut self,
        slot: Option<usize>,
        join: JoinRequest,
        seed: u64,
    ) -> Result<usize, LifecycleError> {
        if self.state.is_started() {
            return Err(LifecycleError::AlreadyStarted);
        }
        if self.state.team_by_player(&join.player_id).is_some() {
            return Err(LifecycleError::PlayerAlreadyJoined {
                player_id: join.player_id,
            });
        }
        self.validate_set(&join)?;

        let slots = self.state.teams.len();
        let slot = match slot {
            Some(slot) if slot >= slots => {
                return Err(LifecycleError::SlotOutOfRange { slot, slots });
            }
            Some(slot) if self.state.teams[slot].is_some() => {
                return Err(LifecycleError::SlotTaken { slot });
            }
            Some(slot) => slot,
            None => self
                .state
                .teams
                .iter()
                .position(Option::is_none)
                .ok_or(LifecycleError::GameFull)?,
        };

        self.state.teams[slot] = Some(Team::new(slot, join, seed));
        Ok(slot)
    }

    fn validate_set(&self, join: &JoinRequest) -> Result<(), LifecycleError> {
        if join.set.units.is_empty() {
            return Err(LifecycleError::EmptySet);
        }
        let probe = Board::new(self.state.config.board_width, self.state.config.board_height);
        let mut seen = HashSet::new();
        for entry in &join.set.units {
            if !probe.contains_position(entry.position) || !seen.insert(entry.position) {
                return Err(LifecycleError::InvalidSetTile {
                    position: entry.position,
                });
            }
        }
        Ok(())
    }

    /// Seals team order and deploys every roster.
    ///
    /// The team in `first_slot` (default slot 0) becomes team 0 and plays
    /// first; the others follow in slot order. Unit ids are allocated from 1
    /// in team order, then roster order.
    pub fn start(
        &mut self,
        now: DateTime<Utc>,
        first_slot: Option<usize>,
    ) -> Result<(), LifecycleError> {
        if self.state.is_started() {
            return Err(LifecycleError::AlreadyStarted);
        }
        let open = self.state.teams.iter().filter(|t| t.is_none()).count();
        if open > 0 {
            return Err(LifecycleError::SlotsOpen { open });
        }

        let count = self.state.teams.len();
        let (width, height) = (self.state.config.board_width, self.state.config.board_height);
        if count > 2 && width != height {
            return Err(LifecycleError::BoardNotSquare { width, height });
        }
        let first = first_slot.unwrap_or(0);
        if first >= count {
            return Err(LifecycleError::SlotOutOfRange {
                slot: first,
                slots: count,
            });
        }

        let mut ordered: Vec<Team> = (0..count)
            .filter_map(|offset| self.state.teams[(first + offset) % count].clone())
            .collect();
        let mut board = Board::new(width, height);
        let mut next_id = 1u32;
        for (index, team) in ordered.iter_mut().enumerate() {
            team.id = TeamId(index as u8);
            team.position = TeamPosition::for_team(team.id, count);
            for entry in &team.set.units {
                let tile = team.position.place(entry.position, width, height);
                let unit = Unit::new(
                    UnitId(next_id),
                    entry.kind,
                    team.id,
                    tile,
                    team.position.orient(entry.direction),
                );
                board.assign_unit(unit, tile)?;
                next_id += 1;
            }
        }

        self.state.teams = ordered.into_iter().map(Some).collect();
        self.state.turn_units = board.snapshot();
        self.state.board = board;
        self.state.current_team_id = TeamId(0);
        self.state.started_at = Some(now);
        self.state.turn_started_at = Some(now);
        Ok(())
    }

    /// Ends the match. A turn in progress is sealed into history first.
    pub fn end(&mut self, winner: Winner, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        if !self.state.is_started() {
            return Err(LifecycleError::NotStarted);
        }
        if self.state.is_ended() {
            return Err(LifecycleError::AlreadyEnded);
        }
        if !self.state.actions.is_empty() {
            self.seal_turn(now);
        }
        self.state.ended_at = Some(now);
        self.state.winner = Some(winner);
        Ok(())
    }

    /// Removes every unit of `team` from play.
    ///
    /// Allowed at any time during the match, whichever team is acting. Returns
    /// the surrender plus the forced `EndTurn` recorded when the acting team
    /// gave up on its own turn and play moved on.
    pub fn surrender(
        &mut self,
        team: TeamId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Action>, EngineError> {
        if !self.state.is_started() {
            return Err(ValidationError::GameNotStarted.into());
        }
        if self.state.is_ended() {
            return Err(ValidationError::GameEnded.into());
        }
        let request = ActionRequest::surrender();
        let resolution = action::resolve(self.state, team, &request)?;
        let mut recorded = vec![self.commit(&request, team, resolution, false)];
        recorded.extend(self.settle(now)?);
        Ok(recorded)
    }

    /// Moves the in-progress actions into a sealed turn.
    pub(super) fn seal_turn(&mut self, now: DateTime<Utc>) {
        let turn = Turn {
            id: self.state.turns.len(),
            team_id: self.state.current_team_id,
            started_at: self.state.turn_started_at.unwrap_or(now),
            units: std::mem::take(&mut self.state.turn_units),
            actions: std::mem::take(&mut self.state.actions),
        };
        self.state.turns.push(turn);
        self.state.turn_units = self.state.board.snapshot();
    }
}
