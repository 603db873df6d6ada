use chrono::{DateTime, Utc};

use crate::action::{self, Action, ActionKind, ActionRequest};
use crate::combat::Resolution;
use crate::state::{TeamId, Winner};

use super::{EngineError, GameEngine};

/// Turn pipeline: submission, closing, sealing and advancing.
impl<'a> GameEngine<'a> {
    /// Validates, resolves and commits one request for the current team.
    ///
    /// Returns every action recorded as a consequence: the submitted one,
    /// plus the implicit `EndTurn` when the unit's budget is exhausted.
    pub fn submit_action(
        &mut self,
        request: &ActionRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<Action>, EngineError> {
        if request.kind == ActionKind::Surrender {
            let team = self.state.current_team_id;
            return self.surrender(team, now);
        }

        action::pre_validate(self.state, request)?;
        if request.kind == ActionKind::EndTurn {
            return Ok(vec![self.close_turn(false, now)?]);
        }

        let team = self.state.current_team_id;
        let resolution = action::resolve(self.state, team, request)?;
        let mut recorded = vec![self.commit(request, team, resolution, false)];
        recorded.extend(self.settle(now)?);
        Ok(recorded)
    }

    /// Applies `requests` in order, stopping at the first rejection.
    ///
    /// Requests accepted before the rejection stay applied.
    pub fn submit_actions(
        &mut self,
        requests: &[ActionRequest],
        now: DateTime<Utc>,
    ) -> Result<Vec<Action>, EngineError> {
        let mut recorded = Vec::new();
        for request in requests {
            recorded.extend(self.submit_action(request, now)?);
        }
        Ok(recorded)
    }

    /// Closes turn `turn_id` with a forced `EndTurn` after its time limit ran
    /// out. Stale ids (the turn already closed), finished games and timeouts
    /// arriving before the turn's deadline are ignored.
    pub fn force_timeout(
        &mut self,
        turn_id: usize,
        now: DateTime<Utc>,
    ) -> Result<Option<Action>, EngineError> {
        if !self.state.is_started()
            || self.state.is_ended()
            || turn_id != self.state.current_turn_id()
        {
            return Ok(None);
        }
        // An undo restarts the turn clock, so an earlier deadline may be stale.
        if self
            .state
            .get_turn_time_limit(turn_id)
            .is_some_and(|deadline| now < deadline)
        {
            return Ok(None);
        }
        self.close_turn(true, now).map(Some)
    }

    /// Writes a successful resolution back into the state.
    pub(super) fn commit(
        &mut self,
        request: &ActionRequest,
        team: TeamId,
        resolution: Resolution,
        forced: bool,
    ) -> Action {
        let Resolution {
            board,
            random,
            results,
        } = resolution;
        self.state.board = board;
        if let Some(acting) = self.state.team_mut(team) {
            acting.random_state = random;
        }
        let recorded = Action::from_request(request, team, results, forced);
        self.state.actions.push(recorded.clone());
        recorded
    }

    /// Post-action checks: game end, then an implicit close when the acting
    /// unit spent its whole budget or the current team has been wiped out.
    pub(super) fn settle(&mut self, now: DateTime<Utc>) -> Result<Option<Action>, EngineError> {
        if self.check_game_end(now)? {
            return Ok(None);
        }
        let exhausted = self.state.has_moved() && self.state.has_attacked();
        let wiped = !self
            .state
            .board
            .has_living_units(self.state.current_team_id);
        if exhausted || wiped {
            return self.close_turn(true, now).map(Some);
        }
        Ok(None)
    }

    /// Records the closing `EndTurn`, seals the turn, and either ends the
    /// match or hands over to the next capable team.
    fn close_turn(&mut self, forced: bool, now: DateTime<Utc>) -> Result<Action, EngineError> {
        let team = self.state.current_team_id;
        let request = ActionRequest::end_turn();
        let resolution = action::resolve(self.state, team, &request)?;
        let recorded = self.commit(&request, team, resolution, forced);
        self.seal_turn(now);

        if self.check_game_end(now)? {
            return Ok(recorded);
        }
        let limit = self.state.config.passed_turn_limit as usize;
        if limit > 0 && self.state.passed_turns() >= limit {
            self.end(Winner::Draw, now)?;
        } else {
            self.advance(now);
        }
        Ok(recorded)
    }

    /// Ends the match once at most one team can still act.
    fn check_game_end(&mut self, now: DateTime<Utc>) -> Result<bool, EngineError> {
        let capable = self.state.capable_teams();
        if capable.len() > 1 {
            return Ok(false);
        }
        let winner = capable.first().copied().map_or(Winner::Draw, Winner::Team);
        self.end(winner, now)?;
        Ok(true)
    }

    /// Passes the turn to the next team with living units, cycling by id.
    fn advance(&mut self, now: DateTime<Utc>) {
        let count = self.state.teams.len();
        let current = self.state.current_team_id.index();
        let next = (1..=count)
            .map(|step| TeamId(((current + step) % count) as u8))
            .find(|id| self.state.board.has_living_units(*id))
            .unwrap_or(self.state.current_team_id);
        self.state.current_team_id = next;
        self.state.turn_started_at = Some(now);
    }
}
