//! End-to-end match scenarios driven through the public engine API.

use chrono::{DateTime, Utc};
use game_core::{
    ActionKind, ActionRequest, Direction, EngineError, ForkOrigin, GameConfig, GameEngine,
    GameOptions, GameState, JoinRequest, Phase, Position, RandomState, ResultKind, SetUnit,
    TeamId, TeamSet, UndoError, UndoMode, UndoPermission, UnitId, UnitKind, Winner, audit_game,
};

fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + seconds, 0).unwrap()
}

fn unit(kind: UnitKind, x: i32, y: i32, direction: Direction) -> SetUnit {
    SetUnit {
        kind,
        position: Position::new(x, y),
        direction,
    }
}

fn set(units: Vec<SetUnit>) -> TeamSet {
    TeamSet {
        name: "custom".into(),
        units,
    }
}

fn start(options: GameOptions, sets: Vec<TeamSet>, seeds: &[u64]) -> GameState {
    let mut state = GameState::new("duel", options).unwrap();
    let mut engine = GameEngine::new(&mut state);
    for (index, (set, seed)) in sets.into_iter().zip(seeds).enumerate() {
        let player = format!("player-{index}");
        engine
            .join(None, JoinRequest::new(player.clone(), player, set), *seed)
            .unwrap();
    }
    engine.start(at(0), None).unwrap();
    state
}

/// Seed whose stream opens with the two given numbers.
fn seed_with_draws(first: u8, second: u8) -> u64 {
    (0..5_000_000u64)
        .find(|&seed| {
            let mut stream = RandomState::create(seed);
            stream.draw().number == first && stream.draw().number == second
        })
        .expect("a seed producing the requested draws")
}

/// Team 0 knight (#1) at (4,5) facing east; team 1 knight (#2) at (5,5)
/// facing north, so #1 strikes its side.
fn knight_duel(options: GameOptions, seed: u64) -> GameState {
    start(
        options,
        vec![
            set(vec![unit(UnitKind::Knight, 4, 5, Direction::East)]),
            set(vec![unit(UnitKind::Knight, 5, 5, Direction::South)]),
        ],
        &[seed, 99],
    )
}

const ATTACKER: UnitId = UnitId(1);
const DEFENDER: UnitId = UnitId(2);

#[test]
fn deployment_rotates_the_north_team() {
    let state = knight_duel(GameOptions::new(2), 1);
    let defender = state.board.unit(DEFENDER).unwrap();
    assert_eq!(defender.position, Position::new(5, 5));
    assert_eq!(defender.direction, Direction::North);
    assert_eq!(defender.team, TeamId(1));
    assert_eq!(state.phase(), Phase::Active);
}

#[test]
fn side_attack_draws_from_stream_and_undo_never_rewinds_it() {
    let seed = seed_with_draws(55, 72);
    let mut state = knight_duel(GameOptions::new(2), seed);
    let mut engine = GameEngine::new(&mut state);

    let first = engine
        .submit_action(&ActionRequest::attack(ATTACKER, Position::new(5, 5)), at(1))
        .unwrap();
    let hit = &first[0].results[0];
    assert_eq!(hit.kind, ResultKind::Hit);
    assert_eq!(hit.unit, DEFENDER);
    assert_eq!(hit.changes.m_health, Some(-13));
    let luck = hit.luck.unwrap();
    assert_eq!((luck.id, luck.chance, luck.number), (1, 60, 55));

    // A drawn luck makes the in-progress undo need approval in strict mode.
    assert_eq!(
        engine.state().can_undo(TeamId(0)),
        UndoPermission::NeedsApproval
    );
    assert!(matches!(
        engine.undo(None, false, at(2)),
        Err(UndoError::ApprovalRequired)
    ));
    engine.undo(None, true, at(2)).unwrap();
    assert_eq!(engine.state().board.unit(DEFENDER).unwrap().m_health, 0);
    assert_eq!(engine.state().team(TeamId(0)).unwrap().random_state.count(), 1);

    let second = engine
        .submit_action(&ActionRequest::attack(ATTACKER, Position::new(5, 5)), at(3))
        .unwrap();
    let block = &second[0].results[0];
    assert_eq!(block.kind, ResultKind::Block);
    assert_eq!(block.changes.direction, Some(Direction::West));
    let luck = block.luck.unwrap();
    assert_eq!((luck.id, luck.chance, luck.number), (2, 60, 72));

    let reports = audit_game(&state).unwrap();
    assert_eq!(reports[0].draws_checked, 1);
    assert_eq!(reports[0].draws_skipped, 1);
    assert!(state.verify_history().is_ok());
}

#[test]
fn empty_turn_is_sealed_and_play_advances() {
    let mut state = knight_duel(GameOptions::new(2), 1);
    let mut engine = GameEngine::new(&mut state);
    let recorded = engine.submit_action(&ActionRequest::end_turn(), at(5)).unwrap();

    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].kind, ActionKind::EndTurn);
    assert!(!recorded[0].forced);
    assert_eq!(state.turns.len(), 1);
    assert!(state.turns[0].is_pass());
    assert!(state.actions.is_empty());
    assert_eq!(state.current_team_id, TeamId(1));
    assert_eq!(state.turn_started_at, Some(at(5)));
}

#[test]
fn move_and_attack_exhausts_the_turn() {
    let mut state = knight_duel(GameOptions::new(2).with_random_hit_chance(false), 1);
    let mut engine = GameEngine::new(&mut state);
    engine
        .submit_action(
            &ActionRequest::move_to(ATTACKER, Position::new(5, 6), None),
            at(1),
        )
        .unwrap();
    // Attacking from behind never needs a roll.
    let recorded = engine
        .submit_action(&ActionRequest::attack(ATTACKER, Position::new(5, 5)), at(2))
        .unwrap();

    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[1].kind, ActionKind::EndTurn);
    assert!(recorded[1].forced);
    assert_eq!(state.current_team_id, TeamId(1));
    let attacker = state.board.unit(ATTACKER).unwrap();
    assert_eq!(attacker.m_recovery, UnitKind::Knight.stats().recovery);
}

#[test]
fn strict_undo_of_sealed_turn_needs_approval() {
    let mut state = knight_duel(GameOptions::new(2), 1);
    let mut engine = GameEngine::new(&mut state);
    engine
        .submit_action(
            &ActionRequest::move_to(ATTACKER, Position::new(4, 7), None),
            at(1),
        )
        .unwrap();
    engine.submit_action(&ActionRequest::end_turn(), at(2)).unwrap();

    assert_eq!(engine.state().can_undo(TeamId(0)), UndoPermission::NeedsApproval);
    assert_eq!(engine.state().can_undo(TeamId(1)), UndoPermission::Denied);
    assert!(matches!(
        engine.undo(Some(TeamId(0)), false, at(3)),
        Err(UndoError::ApprovalRequired)
    ));

    engine.undo(Some(TeamId(0)), true, at(3)).unwrap();
    assert!(state.turns.is_empty());
    assert_eq!(state.current_team_id, TeamId(0));
    assert_eq!(
        state.board.unit(ATTACKER).unwrap().position,
        Position::new(4, 5)
    );
}

#[test]
fn strict_undo_is_refused_once_the_opponent_has_played() {
    let mut state = knight_duel(GameOptions::new(2), 1);
    let mut engine = GameEngine::new(&mut state);
    engine.submit_action(&ActionRequest::end_turn(), at(1)).unwrap();
    engine.submit_action(&ActionRequest::end_turn(), at(2)).unwrap();

    assert!(matches!(
        engine.undo(Some(TeamId(0)), true, at(3)),
        Err(UndoError::NotRequestersTurn)
    ));
}

#[test]
fn loose_undo_reaches_back_to_own_turn() {
    let options = GameOptions::new(2).with_undo_mode(Some(UndoMode::Loose));
    let mut state = knight_duel(options, 1);
    let mut engine = GameEngine::new(&mut state);
    engine
        .submit_action(
            &ActionRequest::move_to(ATTACKER, Position::new(3, 5), None),
            at(1),
        )
        .unwrap();
    engine.submit_action(&ActionRequest::end_turn(), at(2)).unwrap();
    engine.submit_action(&ActionRequest::end_turn(), at(3)).unwrap();

    assert_eq!(engine.state().can_undo(TeamId(0)), UndoPermission::Allowed);
    engine.undo(Some(TeamId(0)), false, at(4)).unwrap();
    assert!(state.turns.is_empty());
    assert_eq!(state.current_team_id, TeamId(0));
}

#[test]
fn disabled_undo_is_rejected() {
    let mut state = knight_duel(GameOptions::new(2).with_undo_mode(None), 1);
    let mut engine = GameEngine::new(&mut state);
    engine.submit_action(&ActionRequest::end_turn(), at(1)).unwrap();
    assert!(matches!(
        engine.undo(Some(TeamId(0)), true, at(2)),
        Err(UndoError::Disabled)
    ));
}

#[test]
fn wrong_team_and_bad_targets_leave_state_untouched() {
    let mut state = knight_duel(GameOptions::new(2), 1);
    let before = state.clone();
    let mut engine = GameEngine::new(&mut state);

    let err = engine
        .submit_action(&ActionRequest::attack(DEFENDER, Position::new(4, 5)), at(1))
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    let err = engine
        .submit_action(&ActionRequest::attack(ATTACKER, Position::new(7, 7)), at(1))
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(state, before);
}

#[test]
fn hits_and_deaths_release_focus() {
    // Team 0: Enchantress #1 at (5,6). Team 1 (mirrored): knights #2 at
    // (4,6) and #3 at (6,6), knight #4 at (5,4).
    let mut state = start(
        GameOptions::new(2).with_random_hit_chance(false),
        vec![
            set(vec![unit(UnitKind::Enchantress, 5, 6, Direction::North)]),
            set(vec![
                unit(UnitKind::Knight, 6, 4, Direction::North),
                unit(UnitKind::Knight, 4, 4, Direction::North),
                unit(UnitKind::Knight, 5, 6, Direction::North),
            ]),
        ],
        &[1, 2],
    );
    let enchantress = UnitId(1);
    let victim = UnitId(4);
    let mut engine = GameEngine::new(&mut state);

    engine
        .submit_action(&ActionRequest::attack(enchantress, Position::new(5, 4)), at(1))
        .unwrap();
    assert!(engine.state().board.unit(victim).unwrap().is_paralyzed());
    assert_eq!(
        engine.state().board.unit(enchantress).unwrap().focusing,
        vec![victim]
    );
    engine.submit_action(&ActionRequest::end_turn(), at(2)).unwrap();

    // Any hit on the source breaks its concentration.
    engine
        .submit_action(&ActionRequest::attack(UnitId(2), Position::new(5, 6)), at(3))
        .unwrap();
    assert!(!engine.state().board.unit(victim).unwrap().is_paralyzed());
    assert!(engine.state().board.unit(enchantress).unwrap().focusing.is_empty());
    engine.submit_action(&ActionRequest::end_turn(), at(4)).unwrap();
    engine.submit_action(&ActionRequest::end_turn(), at(5)).unwrap();

    engine
        .submit_action(&ActionRequest::attack(UnitId(3), Position::new(5, 6)), at(6))
        .unwrap();
    assert!(state.board.unit(enchantress).is_none());
    assert_eq!(state.phase(), Phase::Ended);
    assert_eq!(state.winner, Some(Winner::Team(TeamId(1))));
    assert!(state.actions.is_empty());
    assert!(state.verify_history().is_ok());
}

#[test]
fn dying_source_releases_its_targets_in_the_same_action() {
    // Team 0: Barrier Ward #1 at (5,6), Knight #2 at (5,4). Team 1: Lightning
    // Ward #3 at (5,8).
    let mut state = start(
        GameOptions::new(2).with_random_hit_chance(false),
        vec![
            set(vec![
                unit(UnitKind::BarrierWard, 5, 6, Direction::North),
                unit(UnitKind::Knight, 5, 4, Direction::North),
            ]),
            set(vec![unit(UnitKind::LightningWard, 5, 2, Direction::North)]),
        ],
        &[1, 2],
    );
    let ward = UnitId(1);
    let knight = UnitId(2);
    let mut engine = GameEngine::new(&mut state);

    engine
        .submit_action(&ActionRequest::attack(ward, Position::new(5, 4)), at(1))
        .unwrap();
    assert!(engine.state().board.unit(knight).unwrap().is_barriered());
    engine.submit_action(&ActionRequest::end_turn(), at(2)).unwrap();

    let recorded = engine
        .submit_action(&ActionRequest::attack(UnitId(3), Position::new(5, 6)), at(3))
        .unwrap();
    let kinds: Vec<_> = recorded[0]
        .results
        .iter()
        .map(|result| (result.unit, result.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (UnitId(3), ResultKind::Turn),
            (ward, ResultKind::Hit),
            (knight, ResultKind::BreakFocus),
        ]
    );
    assert!(state.board.unit(ward).is_none());
    assert!(!state.board.unit(knight).unwrap().is_barriered());
    assert_eq!(state.phase(), Phase::Active);
}

#[test]
fn same_seeds_and_inputs_replay_identically() {
    let play = || {
        let mut state = knight_duel(GameOptions::new(2), 4242);
        let mut engine = GameEngine::new(&mut state);
        engine
            .submit_actions(
                &[
                    ActionRequest::attack(ATTACKER, Position::new(5, 5)),
                    ActionRequest::end_turn(),
                    ActionRequest::turn(DEFENDER, Direction::West),
                    ActionRequest::attack(DEFENDER, Position::new(4, 5)),
                    ActionRequest::end_turn(),
                ],
                at(1),
            )
            .unwrap();
        state
    };
    assert_eq!(play(), play());
}

#[test]
fn timeout_forces_a_pass_once() {
    let options = GameOptions::new(2)
        .with_config(GameConfig::default().with_turn_time_limit(30));
    let mut state = knight_duel(options, 1);
    assert_eq!(state.get_turn_time_limit(0), Some(at(30)));

    let mut engine = GameEngine::new(&mut state);
    let forced = engine.force_timeout(0, at(30)).unwrap().unwrap();
    assert_eq!(forced.kind, ActionKind::EndTurn);
    assert!(forced.forced);
    assert!(engine.force_timeout(0, at(31)).unwrap().is_none());
    assert_eq!(state.current_team_id, TeamId(1));
    assert_eq!(state.get_turn_time_limit(1), Some(at(60)));
}

#[test]
fn passed_turn_limit_ends_in_a_draw() {
    let mut config = GameConfig::default();
    config.passed_turn_limit = 2;
    let mut state = knight_duel(GameOptions::new(2).with_config(config), 1);
    let mut engine = GameEngine::new(&mut state);
    engine.submit_action(&ActionRequest::end_turn(), at(1)).unwrap();
    engine.submit_action(&ActionRequest::end_turn(), at(2)).unwrap();
    assert_eq!(state.winner, Some(Winner::Draw));
}

#[test]
fn surrender_out_of_turn_ends_the_match_for_good() {
    let mut state = knight_duel(GameOptions::new(2), 1);
    let mut engine = GameEngine::new(&mut state);
    let recorded = engine.surrender(TeamId(1), at(1)).unwrap();

    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].team_id, TeamId(1));
    assert_eq!(recorded[0].results[0].kind, ResultKind::Surrender);
    assert_eq!(engine.state().winner, Some(Winner::Team(TeamId(0))));
    assert!(matches!(
        engine.undo(Some(TeamId(1)), true, at(2)),
        Err(UndoError::GameNotActive)
    ));
    assert!(audit_game(&state).is_ok());
}

#[test]
fn fork_restarts_from_a_sealed_turn_with_fresh_streams() {
    let mut state = knight_duel(GameOptions::new(2), 7);
    let mut engine = GameEngine::new(&mut state);
    engine
        .submit_action(&ActionRequest::attack(ATTACKER, Position::new(5, 5)), at(1))
        .unwrap();
    engine.submit_action(&ActionRequest::end_turn(), at(2)).unwrap();
    engine.submit_action(&ActionRequest::end_turn(), at(3)).unwrap();

    let forked = state.fork(1, "duel-b", &[11, 12], at(10)).unwrap();
    assert_eq!(forked.id, "duel-b");
    assert_eq!(forked.turns.len(), 1);
    assert_eq!(forked.current_team_id, TeamId(1));
    assert_eq!(forked.board.units(), state.turns[1].units.as_slice());
    assert_eq!(
        forked.forked_from,
        Some(ForkOrigin {
            game_id: "duel".into(),
            turn_id: 1,
        })
    );
    assert!(forked
        .teams
        .iter()
        .flatten()
        .all(|team| team.random_state.count() == 0));
    assert!(audit_game(&forked).is_ok());
    assert!(forked.verify_history().is_ok());

    assert!(state.fork(9, "duel-c", &[1, 2], at(10)).is_err());
    assert!(state.fork(1, "duel-c", &[1], at(10)).is_err());
}

#[test]
fn undo_restarts_the_turn_clock() {
    let options = GameOptions::new(2)
        .with_undo_mode(Some(UndoMode::Loose))
        .with_config(GameConfig::default().with_turn_time_limit(30));
    let mut state = knight_duel(options, 1);
    let mut engine = GameEngine::new(&mut state);
    engine
        .submit_action(
            &ActionRequest::move_to(ATTACKER, Position::new(4, 7), None),
            at(1),
        )
        .unwrap();
    engine.undo(None, false, at(20)).unwrap();
    assert_eq!(engine.state().get_turn_time_limit(0), Some(at(50)));

    // The opening deadline has passed, the restarted one has not.
    assert!(engine.force_timeout(0, at(30)).unwrap().is_none());
    assert!(engine.state().turns.is_empty());
    assert_eq!(engine.state().current_team_id, TeamId(0));

    let forced = engine.force_timeout(0, at(50)).unwrap().unwrap();
    assert!(forced.forced);
    assert_eq!(state.turns.len(), 1);
    assert_eq!(state.current_team_id, TeamId(1));
}

/// Three knights, one per side: #1 south, #2 west, #3 north.
fn three_way(options: GameOptions) -> GameState {
    let knight = || set(vec![unit(UnitKind::Knight, 5, 9, Direction::North)]);
    start(options, vec![knight(), knight(), knight()], &[1, 2, 3])
}

#[test]
fn surrender_on_own_turn_hands_over_to_the_next_team() {
    let mut state = three_way(GameOptions::new(3));
    let mut engine = GameEngine::new(&mut state);
    let recorded = engine.surrender(TeamId(0), at(1)).unwrap();

    let kinds: Vec<_> = recorded.iter().map(|action| action.kind).collect();
    assert_eq!(kinds, vec![ActionKind::Surrender, ActionKind::EndTurn]);
    assert!(recorded[1].forced);
    assert_eq!(engine.state().turns.len(), 1);
    assert_eq!(engine.state().turns[0].actions, recorded);
    assert_eq!(engine.state().current_team_id, TeamId(1));
    assert_eq!(engine.state().phase(), Phase::Active);

    // The surrendered team is skipped from now on.
    engine.submit_action(&ActionRequest::end_turn(), at(2)).unwrap();
    engine.submit_action(&ActionRequest::end_turn(), at(3)).unwrap();
    assert_eq!(state.current_team_id, TeamId(1));
    assert!(state.verify_history().is_ok());
}

#[test]
fn loose_undo_rewinds_several_turns_to_the_requester() {
    let mut state = three_way(GameOptions::new(3).with_undo_mode(Some(UndoMode::Loose)));
    assert_eq!(state.board.unit(UnitId(2)).unwrap().position, Position::new(1, 5));
    let mut engine = GameEngine::new(&mut state);
    engine
        .submit_action(
            &ActionRequest::move_to(UnitId(1), Position::new(5, 8), None),
            at(1),
        )
        .unwrap();
    engine.submit_action(&ActionRequest::end_turn(), at(2)).unwrap();
    engine
        .submit_action(
            &ActionRequest::move_to(UnitId(2), Position::new(2, 5), None),
            at(3),
        )
        .unwrap();
    engine.submit_action(&ActionRequest::end_turn(), at(4)).unwrap();
    engine.submit_action(&ActionRequest::end_turn(), at(5)).unwrap();
    assert_eq!(engine.state().turns.len(), 3);
    assert_eq!(engine.state().current_team_id, TeamId(0));

    assert_eq!(engine.state().can_undo(TeamId(1)), UndoPermission::Allowed);
    engine.undo(Some(TeamId(1)), false, at(6)).unwrap();

    assert_eq!(state.turns.len(), 1);
    assert_eq!(state.current_team_id, TeamId(1));
    assert!(state.actions.is_empty());
    assert_eq!(state.board.unit(UnitId(2)).unwrap().position, Position::new(1, 5));
    assert_eq!(state.board.unit(UnitId(1)).unwrap().position, Position::new(5, 8));
    assert!(state.verify_history().is_ok());
}
