//! Scratch-space resolution of one action.
//!
//! A [`Resolver`] owns copies of the board and the acting team's random
//! stream. Every result is applied to the scratch board the moment it is
//! recorded, using the same [`Board::apply_result`] replay uses, so later
//! results in the same action observe earlier ones. Nothing reaches the real
//! game state unless the whole action succeeds.

use crate::board::{Board, BoardError, Direction, Position};
use crate::config::GameConfig;
use crate::random::RandomState;
use crate::units::{Focusable, StatusKind, Unit, UnitId};

use super::damage::{DamageType, apply_damage, apply_heal, calculate_damage};
use super::hit::{calculate_hit_chance, check_hit};
use super::result::{Luck, ResultKind, UnitChanges, UnitResult};

/// Committed output of a successful resolution.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub board: Board,
    pub random: RandomState,
    pub results: Vec<UnitResult>,
}

pub struct Resolver {
    board: Board,
    random: RandomState,
    use_luck: bool,
    results: Vec<UnitResult>,
}

impl Resolver {
    /// `use_luck` is true only when both the match and the acting team
    /// resolve chances with the random stream.
    pub fn new(board: Board, random: RandomState, use_luck: bool) -> Self {
        Self {
            board,
            random,
            use_luck,
            results: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn get_unit(&self, id: UnitId) -> Result<&Unit, BoardError> {
        self.board.get_unit(id)
    }

    pub fn results(&self) -> &[UnitResult] {
        &self.results
    }

    pub fn finish(self) -> Resolution {
        Resolution {
            board: self.board,
            random: self.random,
            results: self.results,
        }
    }

    /// Records a result and applies it to the scratch board.
    pub fn push(&mut self, result: UnitResult) -> Result<(), BoardError> {
        self.board.apply_result(&result)?;
        self.results.push(result);
        Ok(())
    }

    /// Resolves a chance. Draws only when `0 < chance < 100` and luck is on.
    pub fn roll(&mut self, chance: u8) -> (bool, Option<Luck>) {
        if chance >= 100 {
            return (true, None);
        }
        if chance == 0 {
            return (false, None);
        }
        if self.use_luck {
            let draw = self.random.draw();
            let luck = Luck {
                id: draw.id,
                chance,
                number: draw.number,
            };
            (check_hit(chance, draw.number), Some(luck))
        } else {
            (check_hit(chance, GameConfig::FIXED_ROLL), None)
        }
    }

    /// Turns `unit` towards `target` when it is not already facing it.
    pub fn face(&mut self, unit: UnitId, target: Position) -> Result<(), BoardError> {
        let current = self.get_unit(unit)?;
        let Some(direction) = Direction::toward(current.position, target) else {
            return Ok(());
        };
        if direction == current.direction {
            return Ok(());
        }
        self.push(
            UnitResult::new(unit, ResultKind::Turn).with_changes(UnitChanges {
                direction: Some(direction),
                ..UnitChanges::default()
            }),
        )
    }

    /// Resolves one attack from `attacker` against `target`.
    ///
    /// Emits `Immune` for magic against a barrier, `Block` (target turns to
    /// face the attacker) on a failed roll, or `Hit` followed by focus
    /// sub-results.
    pub fn strike(
        &mut self,
        attacker: UnitId,
        target: UnitId,
        damage_type: DamageType,
        blockable: bool,
    ) -> Result<(), BoardError> {
        if !self.board.contains(target) {
            return Ok(());
        }
        let source = self.get_unit(attacker)?.clone();
        let defender = self.get_unit(target)?.clone();

        if damage_type == DamageType::Magic && defender.is_barriered() {
            return self.push(UnitResult::new(target, ResultKind::Immune));
        }

        let mut luck = None;
        if blockable {
            let chance = calculate_hit_chance(source.position, &defender);
            let (hit, drawn) = self.roll(chance);
            if !hit {
                let changes = UnitChanges {
                    direction: Direction::toward(defender.position, source.position)
                        .filter(|d| *d != defender.direction),
                    ..UnitChanges::default()
                };
                return self.push(
                    UnitResult::new(target, ResultKind::Block)
                        .with_changes(changes)
                        .with_luck(drawn),
                );
            }
            luck = drawn;
        }

        let damage = calculate_damage(source.power(), defender.armor(), damage_type);
        let m_health = apply_damage(defender.health(), defender.m_health, damage);
        self.push(
            UnitResult::new(target, ResultKind::Hit)
                .with_changes(UnitChanges {
                    m_health: Some(m_health),
                    ..UnitChanges::default()
                })
                .with_luck(luck),
        )?;

        if defender.health() + m_health <= 0 {
            self.release(&defender)
        } else {
            self.break_focus(target)
        }
    }

    /// Removes `unit` from play (surrender) and releases its focus links.
    pub fn eliminate(&mut self, unit: UnitId) -> Result<(), BoardError> {
        let doomed = self.get_unit(unit)?.clone();
        self.push(
            UnitResult::new(unit, ResultKind::Surrender).with_changes(UnitChanges {
                m_health: Some(-doomed.health()),
                ..UnitChanges::default()
            }),
        )?;
        self.release(&doomed)
    }

    /// Ends every focus held by `source`.
    pub fn break_focus(&mut self, source: UnitId) -> Result<(), BoardError> {
        let unit = self.get_unit(source)?.clone();
        let results = unit.rules().get_break_focus_result(&self.board, &unit);
        for result in results {
            self.push(result)?;
        }
        Ok(())
    }

    /// Starts a focus from `source` granting `status` to `targets`.
    ///
    /// Any focus `source` already holds is broken first. Barriered units
    /// ignore harmful statuses. Paralysis breaks the paralyzed unit's own
    /// focus.
    pub fn focus(
        &mut self,
        source: UnitId,
        targets: &[UnitId],
        status: StatusKind,
    ) -> Result<(), BoardError> {
        if self.get_unit(source)?.is_focusing() {
            self.break_focus(source)?;
        }

        let mut focused = Vec::new();
        for &id in targets {
            let Some(target) = self.board.unit(id).cloned() else {
                continue;
            };
            if status.is_harmful() && target.is_barriered() {
                self.push(UnitResult::new(id, ResultKind::Immune))?;
                continue;
            }
            self.push(
                UnitResult::new(id, ResultKind::Focus).with_changes(UnitChanges::status(
                    status,
                    target.sources_with(status, source),
                )),
            )?;
            focused.push(id);
            if status == StatusKind::Paralysis && target.is_focusing() {
                self.break_focus(id)?;
            }
        }

        if focused.is_empty() {
            return Ok(());
        }
        self.push(
            UnitResult::new(source, ResultKind::Focus).with_changes(UnitChanges {
                focusing: Some(focused),
                ..UnitChanges::default()
            }),
        )
    }

    /// Heals `target` and cleanses paralysis and poison.
    pub fn heal(&mut self, target: UnitId, amount: i32) -> Result<(), BoardError> {
        let unit = self.get_unit(target)?.clone();
        let mut changes = UnitChanges {
            m_health: Some(apply_heal(unit.m_health, amount)),
            ..UnitChanges::default()
        };
        let mut cleansed_from = Vec::new();
        for status in [StatusKind::Paralysis, StatusKind::Poison] {
            if !unit.sources(status).is_empty() {
                cleansed_from.extend_from_slice(unit.sources(status));
                changes.set_status(status, Vec::new());
            }
        }
        self.push(UnitResult::new(target, ResultKind::Heal).with_changes(changes))?;

        cleansed_from.sort();
        cleansed_from.dedup();
        self.detach(target, &cleansed_from)
    }

    /// Cleans up after `dead` left the board: its own focus ends and every
    /// unit focusing it drops it from its `focusing` list.
    fn release(&mut self, dead: &Unit) -> Result<(), BoardError> {
        let results = dead.rules().get_break_focus_result(&self.board, dead);
        for result in results {
            self.push(result)?;
        }
        self.detach(dead.id, &dead.all_sources())
    }

    /// Removes `target` from the `focusing` list of each of `sources`.
    fn detach(&mut self, target: UnitId, sources: &[UnitId]) -> Result<(), BoardError> {
        for &source in sources {
            let Some(unit) = self.board.unit(source) else {
                continue;
            };
            if !unit.focusing.contains(&target) {
                continue;
            }
            let focusing = unit
                .focusing
                .iter()
                .copied()
                .filter(|id| *id != target)
                .collect();
            self.push(
                UnitResult::new(source, ResultKind::BreakFocus).with_changes(UnitChanges {
                    focusing: Some(focusing),
                    ..UnitChanges::default()
                }),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TeamId;
    use crate::units::UnitKind;

    fn place(board: &mut Board, id: u32, kind: UnitKind, team: u8, tile: Position, dir: Direction) {
        board
            .assign_unit(Unit::new(UnitId(id), kind, TeamId(team), tile, dir), tile)
            .unwrap();
    }

    #[test]
    fn fixed_roll_resolves_without_drawing() {
        let mut resolver = Resolver::new(Board::new(5, 5), RandomState::create(1), false);
        assert_eq!(resolver.roll(60), (true, None));
        assert_eq!(resolver.roll(50), (false, None));
        assert_eq!(resolver.finish().random.count(), 0);
    }

    #[test]
    fn certain_chances_never_draw() {
        let mut resolver = Resolver::new(Board::new(5, 5), RandomState::create(1), true);
        assert_eq!(resolver.roll(100), (true, None));
        assert_eq!(resolver.roll(0), (false, None));
        assert_eq!(resolver.finish().random.count(), 0);
    }

    #[test]
    fn back_attack_hits_without_luck() {
        let mut board = Board::new(7, 7);
        place(&mut board, 1, UnitKind::Knight, 0, Position::new(3, 4), Direction::North);
        place(&mut board, 2, UnitKind::Knight, 1, Position::new(3, 3), Direction::North);

        let mut resolver = Resolver::new(board, RandomState::create(3), true);
        resolver
            .strike(UnitId(1), UnitId(2), DamageType::Physical, true)
            .unwrap();
        let resolution = resolver.finish();
        assert_eq!(resolution.results.len(), 1);
        let hit = &resolution.results[0];
        assert_eq!(hit.kind, ResultKind::Hit);
        assert_eq!(hit.luck, None);
        assert_eq!(hit.changes.m_health, Some(-13));
        assert_eq!(resolution.random.count(), 0);
    }

    #[test]
    fn barrier_makes_magic_immune() {
        let mut board = Board::new(7, 7);
        place(&mut board, 1, UnitKind::LightningWard, 0, Position::new(3, 5), Direction::North);
        place(&mut board, 2, UnitKind::Knight, 1, Position::new(3, 3), Direction::South);
        let mut resolver = Resolver::new(board, RandomState::create(3), true);
        let mut shielded = resolver.get_unit(UnitId(2)).unwrap().clone();
        shielded.barriered.push(UnitId(9));
        resolver
            .push(
                UnitResult::new(UnitId(2), ResultKind::Focus)
                    .with_changes(UnitChanges::status(StatusKind::Barrier, shielded.barriered)),
            )
            .unwrap();

        resolver
            .strike(UnitId(1), UnitId(2), DamageType::Magic, false)
            .unwrap();
        let last = resolver.results().last().unwrap();
        assert_eq!(last.kind, ResultKind::Immune);
        assert_eq!(resolver.get_unit(UnitId(2)).unwrap().m_health, 0);
    }

    #[test]
    fn focus_then_source_death_breaks_focus_in_same_results() {
        let mut board = Board::new(7, 7);
        place(&mut board, 1, UnitKind::BarrierWard, 0, Position::new(1, 1), Direction::South);
        place(&mut board, 2, UnitKind::Knight, 0, Position::new(1, 3), Direction::South);
        place(&mut board, 3, UnitKind::LightningWard, 1, Position::new(1, 4), Direction::North);

        let mut resolver = Resolver::new(board, RandomState::create(3), false);
        resolver
            .focus(UnitId(1), &[UnitId(2)], StatusKind::Barrier)
            .unwrap();
        assert!(resolver.get_unit(UnitId(2)).unwrap().is_barriered());

        // Lightning deals 30 magic damage; the ward has 28 health.
        resolver
            .strike(UnitId(3), UnitId(1), DamageType::Magic, false)
            .unwrap();
        assert!(!resolver.board().contains(UnitId(1)));
        let knight = resolver.get_unit(UnitId(2)).unwrap();
        assert!(!knight.is_barriered());
        let kinds: Vec<_> = resolver.results().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ResultKind::Focus,
                ResultKind::Focus,
                ResultKind::Hit,
                ResultKind::BreakFocus
            ]
        );
    }

    #[test]
    fn heal_cleanses_and_detaches_sources() {
        let mut board = Board::new(7, 7);
        place(&mut board, 1, UnitKind::PoisonWisp, 1, Position::new(1, 1), Direction::South);
        place(&mut board, 2, UnitKind::Knight, 0, Position::new(1, 2), Direction::North);
        let mut resolver = Resolver::new(board, RandomState::create(3), false);
        resolver
            .focus(UnitId(1), &[UnitId(2)], StatusKind::Poison)
            .unwrap();
        assert!(resolver.get_unit(UnitId(2)).unwrap().is_poisoned());

        resolver.heal(UnitId(2), 12).unwrap();
        assert!(!resolver.get_unit(UnitId(2)).unwrap().is_poisoned());
        assert!(resolver.get_unit(UnitId(1)).unwrap().focusing.is_empty());
    }
}
