//! Validation and resolution of a single action request.

use crate::board::Direction;
use crate::combat::{Resolution, Resolver, ResultKind, UnitChanges, UnitResult};
use crate::state::{GameState, TeamId};
use crate::units::{CombatCapability, Targetable, Unit};

use super::{ActionKind, ActionRequest, ValidationError};

/// Checks that `request` is legal for the current team right now.
///
/// Never mutates. Surrender and end-turn are always legal while the game is
/// active.
pub fn pre_validate(state: &GameState, request: &ActionRequest) -> Result<(), ValidationError> {
    if !state.is_started() {
        return Err(ValidationError::GameNotStarted);
    }
    if state.is_ended() {
        return Err(ValidationError::GameEnded);
    }
    if !request.kind.is_unit_action() {
        return Ok(());
    }

    let team = state.current_team_id;
    let id = request.unit.ok_or(ValidationError::MissingUnit)?;
    let unit = state
        .board
        .unit(id)
        .ok_or(ValidationError::UnitNotFound { unit: id })?;
    if unit.team != team {
        return Err(ValidationError::NotOwnUnit { unit: id, team });
    }
    if unit.is_paralyzed() {
        return Err(ValidationError::UnitParalyzed { unit: id });
    }
    if unit.m_recovery > 0 {
        return Err(ValidationError::UnitRecovering {
            unit: id,
            turns: unit.m_recovery,
        });
    }
    match state.selected_unit() {
        Some(selected) if selected != id => {
            return Err(ValidationError::OtherUnitSelected { selected });
        }
        _ => {}
    }

    match request.kind {
        ActionKind::Move => {
            if state.has_moved() {
                return Err(ValidationError::AlreadyMoved { unit: id });
            }
            let target = request.target.ok_or(ValidationError::MissingTarget)?;
            if !state.board.move_tiles(id)?.contains(&target) {
                return Err(ValidationError::InvalidTarget { unit: id, target });
            }
        }
        ActionKind::Attack => {
            if state.has_attacked() {
                return Err(ValidationError::AlreadyAttacked { unit: id });
            }
            let target = request.target.ok_or(ValidationError::MissingTarget)?;
            let rules = unit.rules();
            if !rules.get_attack_tiles(&state.board, unit).contains(&target) {
                return Err(ValidationError::InvalidTarget { unit: id, target });
            }
            if rules.get_target_units(&state.board, unit, target).is_empty() {
                return Err(ValidationError::NoTargets { target });
            }
        }
        ActionKind::AttackSpecial => {
            let rules = unit.rules();
            if !rules.has_special() {
                return Err(ValidationError::NoSpecialAttack { unit: id });
            }
            if state.has_attacked() {
                return Err(ValidationError::AlreadyAttacked { unit: id });
            }
            let target = request.target.ok_or(ValidationError::MissingTarget)?;
            if !rules.get_special_tiles(&state.board, unit).contains(&target) {
                return Err(ValidationError::InvalidTarget { unit: id, target });
            }
            if rules
                .get_special_target_units(&state.board, unit, target)
                .is_empty()
            {
                return Err(ValidationError::NoTargets { target });
            }
        }
        ActionKind::Turn => {
            request.direction.ok_or(ValidationError::MissingDirection)?;
        }
        ActionKind::EndTurn | ActionKind::Surrender => {}
    }
    Ok(())
}

/// Computes the results of `request` performed by `team` without touching
/// `state`.
pub fn resolve(
    state: &GameState,
    team: TeamId,
    request: &ActionRequest,
) -> Result<Resolution, ValidationError> {
    let random = state
        .team(team)
        .map(|t| t.random_state.clone())
        .ok_or(ValidationError::TeamNotFound { team })?;
    let mut resolver = Resolver::new(state.board.clone(), random, state.uses_luck(team));

    match request.kind {
        ActionKind::Move => {
            let id = request.unit.ok_or(ValidationError::MissingUnit)?;
            let target = request.target.ok_or(ValidationError::MissingTarget)?;
            let unit = resolver.get_unit(id)?;
            let direction = request
                .direction
                .or_else(|| Direction::toward(unit.position, target))
                .unwrap_or(unit.direction);
            resolver.push(
                UnitResult::new(id, ResultKind::Move).with_changes(UnitChanges {
                    position: Some(target),
                    direction: Some(direction),
                    ..UnitChanges::default()
                }),
            )?;
        }
        ActionKind::Turn => {
            let id = request.unit.ok_or(ValidationError::MissingUnit)?;
            let direction = request.direction.ok_or(ValidationError::MissingDirection)?;
            resolver.push(
                UnitResult::new(id, ResultKind::Turn).with_changes(UnitChanges {
                    direction: Some(direction),
                    ..UnitChanges::default()
                }),
            )?;
        }
        ActionKind::Attack | ActionKind::AttackSpecial => {
            let id = request.unit.ok_or(ValidationError::MissingUnit)?;
            let target = request.target.ok_or(ValidationError::MissingTarget)?;
            let rules = resolver.get_unit(id)?.rules();
            if request.kind == ActionKind::Attack {
                rules.get_attack_results(&mut resolver, id, target)?;
            } else {
                rules.get_attack_special_results(&mut resolver, id, target)?;
            }
        }
        ActionKind::EndTurn => end_turn_results(state, team, &mut resolver)?,
        ActionKind::Surrender => {
            let ids: Vec<_> = resolver
                .board()
                .team_units(team)
                .map(|unit| unit.id)
                .collect();
            for id in ids {
                if resolver.board().contains(id) {
                    resolver.eliminate(id)?;
                }
            }
        }
    }

    Ok(resolver.finish())
}

/// Recovery bookkeeping recorded on the closing `EndTurn`.
///
/// The unit that acted recovers fully after an attack or half (rounded down)
/// after a move-only turn; every other recovering unit of the team ticks down
/// by one.
pub fn end_turn_results(
    state: &GameState,
    team: TeamId,
    resolver: &mut Resolver,
) -> Result<(), ValidationError> {
    let selected = state.selected_unit();
    let moved = state.has_moved();
    let attacked = state.has_attacked();

    let units: Vec<Unit> = resolver.board().team_units(team).cloned().collect();
    for unit in units {
        let recovery = unit.stats().recovery;
        let next = if Some(unit.id) == selected && attacked {
            recovery
        } else if Some(unit.id) == selected && moved {
            recovery / 2
        } else {
            unit.m_recovery.saturating_sub(1)
        };
        if next != unit.m_recovery {
            resolver.push(
                UnitResult::new(unit.id, ResultKind::Recovery).with_changes(UnitChanges {
                    m_recovery: Some(next),
                    ..UnitChanges::default()
                }),
            )?;
        }
    }
    Ok(())
}
