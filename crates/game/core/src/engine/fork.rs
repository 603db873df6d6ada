use chrono::{DateTime, Utc};

use crate::random::RandomState;
use crate::state::{ForkOrigin, GameState, LifecycleError};

impl GameState {
    /// Branches a new active match from the opening of turn `turn_id`.
    ///
    /// History before `turn_id` is copied, the board is restored to that
    /// turn's opening snapshot, and every team receives a fresh random stream
    /// seeded from `seeds` (one per team, in team order). `turn_id` may name
    /// the turn in progress.
    pub fn fork(
        &self,
        turn_id: usize,
        new_id: impl Into<String>,
        seeds: &[u64],
        now: DateTime<Utc>,
    ) -> Result<GameState, LifecycleError> {
        if !self.is_started() {
            return Err(LifecycleError::NotStarted);
        }
        if seeds.len() != self.teams.len() {
            return Err(LifecycleError::SeedCount {
                expected: self.teams.len(),
                got: seeds.len(),
            });
        }
        let (units, team_id) = match self.turns.get(turn_id) {
            Some(turn) => (turn.units.clone(), turn.team_id),
            None if turn_id == self.current_turn_id() => {
                (self.turn_units.clone(), self.current_team_id)
            }
            None => return Err(LifecycleError::TurnNotFound { turn_id }),
        };

        let mut forked = self.clone();
        forked.board.restore(units.clone())?;
        forked.id = new_id.into();
        forked.turns.truncate(turn_id);
        forked.actions.clear();
        forked.turn_units = units;
        forked.current_team_id = team_id;
        forked.started_at = Some(now);
        forked.turn_started_at = Some(now);
        forked.ended_at = None;
        forked.winner = None;
        forked.forked_from = Some(ForkOrigin {
            game_id: self.id.clone(),
            turn_id,
        });
        for (team, seed) in forked.teams.iter_mut().flatten().zip(seeds) {
            team.random_state = RandomState::create(*seed);
        }
        Ok(forked)
    }
}
