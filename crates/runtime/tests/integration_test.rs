use std::sync::Arc;
use std::time::Duration;

use game_core::{
    ActionKind, ActionRequest, Direction, GameConfig, GameOptions, JoinRequest, Phase, Position,
    SetUnit, TeamId, TeamSet, UndoMode, UndoPermission, UnitId, UnitKind, Winner,
};
use runtime::{
    ActionProvider, Event, GameRepository, GameStateEvent, InMemoryGameRepo, PassActionProvider,
    Runtime, RuntimeConfig, RuntimeError, RuntimeHandle, Topic, TurnEvent,
};
use tokio::sync::broadcast;

fn set(kind: UnitKind, x: i32, y: i32, direction: Direction) -> TeamSet {
    TeamSet {
        name: "duel".into(),
        units: vec![SetUnit {
            kind,
            position: Position::new(x, y),
            direction,
        }],
    }
}

/// Team 0 knight (#1) at (4,5) facing east; team 1 knight (#2) at (5,5).
async fn seat_duel(handle: &RuntimeHandle) {
    handle
        .join(
            None,
            JoinRequest::new("alice", "Alice", set(UnitKind::Knight, 4, 5, Direction::East)),
            Some(1),
        )
        .await
        .expect("alice should join");
    handle
        .join(
            None,
            JoinRequest::new("bob", "Bob", set(UnitKind::Knight, 5, 5, Direction::South)),
            Some(2),
        )
        .await
        .expect("bob should join");
    handle.start(None).await.expect("game should start");
}

async fn next_event<F>(rx: &mut broadcast::Receiver<Event>, mut wanted: F) -> Event
where
    F: FnMut(&Event) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.expect("event bus should stay open");
            if wanted(&event) {
                return event;
            }
        }
    })
    .await
    .expect("expected event within timeout")
}

fn no_timer() -> RuntimeConfig {
    RuntimeConfig {
        enable_turn_timer: false,
        ..RuntimeConfig::default()
    }
}

#[tokio::test]
async fn test_match_flow_through_handle() {
    let runtime = Runtime::builder()
        .config(no_timer())
        .new_game("flow", GameOptions::new(2))
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();
    let mut game_events = handle.subscribe(Topic::GameState);

    seat_duel(&handle).await;
    next_event(&mut game_events, |event| {
        matches!(event, Event::GameState(GameStateEvent::Started { game_id }) if game_id == "flow")
    })
    .await;

    handle
        .submit_action(ActionRequest::move_to(UnitId(1), Position::new(4, 7), None))
        .await
        .expect("move should be accepted");
    let recorded = handle
        .submit_action(ActionRequest::end_turn())
        .await
        .expect("end turn should be accepted");
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].kind, ActionKind::EndTurn);

    let state = handle.query_state().await.expect("state query");
    assert_eq!(state.turns.len(), 1);
    assert_eq!(state.current_team_id, TeamId(1));

    assert_eq!(
        handle.can_undo(TeamId(0)).await.expect("can_undo"),
        UndoPermission::NeedsApproval
    );
    let refused = handle.undo(Some(TeamId(0)), false).await;
    assert!(matches!(refused, Err(RuntimeError::Engine(_))));
    handle
        .undo(Some(TeamId(0)), true)
        .await
        .expect("approved undo should succeed");
    let state = handle.query_state().await.expect("state query");
    assert!(state.turns.is_empty());
    assert_eq!(state.current_team_id, TeamId(0));

    handle.surrender(TeamId(1)).await.expect("surrender");
    let ended = next_event(&mut game_events, |event| {
        matches!(event, Event::GameState(GameStateEvent::Ended { .. }))
    })
    .await;
    assert!(matches!(
        ended,
        Event::GameState(GameStateEvent::Ended {
            winner: Winner::Team(TeamId(0))
        })
    ));

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn test_rejected_action_is_announced_and_leaves_state() {
    let runtime = Runtime::builder()
        .config(no_timer())
        .new_game("reject", GameOptions::new(2))
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();
    seat_duel(&handle).await;
    let before = handle.query_state().await.expect("state query");
    let mut game_events = handle.subscribe(Topic::GameState);

    // Unit #2 belongs to team 1, which is not playing.
    let err = handle
        .submit_action(ActionRequest::turn(UnitId(2), Direction::West))
        .await
        .expect_err("foreign unit must be rejected");
    assert!(matches!(err, RuntimeError::Engine(_)));

    let event = next_event(&mut game_events, |event| {
        matches!(event, Event::GameState(GameStateEvent::ActionRejected { .. }))
    })
    .await;
    if let Event::GameState(GameStateEvent::ActionRejected { code, .. }) = event {
        assert!(!code.is_empty());
    }
    assert_eq!(handle.query_state().await.expect("state query"), before);

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn test_turn_timer_forces_end_of_turn() {
    let options =
        GameOptions::new(2).with_config(GameConfig::default().with_turn_time_limit(1));
    let runtime = Runtime::builder()
        .new_game("timed", options)
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();
    let mut turn_events = handle.subscribe(Topic::Turn);
    seat_duel(&handle).await;

    let started = next_event(&mut turn_events, |event| {
        matches!(event, Event::Turn(TurnEvent::Started { turn_id: 0, .. }))
    })
    .await;
    assert!(matches!(
        started,
        Event::Turn(TurnEvent::Started {
            deadline: Some(_),
            ..
        })
    ));

    next_event(&mut turn_events, |event| {
        matches!(event, Event::Turn(TurnEvent::TimedOut { turn_id: 0 }))
    })
    .await;

    let turn = handle
        .turn_data(0)
        .await
        .expect("turn data query")
        .expect("turn 0 is sealed");
    let forced = turn.actions.last().expect("forced end of turn recorded");
    assert_eq!(forced.kind, ActionKind::EndTurn);
    assert!(forced.forced);

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn test_undo_restarts_the_turn_clock() {
    let options = GameOptions::new(2)
        .with_undo_mode(Some(UndoMode::Loose))
        .with_config(GameConfig::default().with_turn_time_limit(30));
    let runtime = Runtime::builder()
        .config(no_timer())
        .new_game("clock", options)
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();
    let mut turn_events = handle.subscribe(Topic::Turn);
    seat_duel(&handle).await;

    let Event::Turn(TurnEvent::Started {
        deadline: Some(opening),
        ..
    }) = next_event(&mut turn_events, |event| {
        matches!(event, Event::Turn(TurnEvent::Started { turn_id: 0, .. }))
    })
    .await
    else {
        panic!("turn 0 should announce a deadline");
    };

    handle
        .submit_action(ActionRequest::move_to(UnitId(1), Position::new(4, 7), None))
        .await
        .expect("move should be accepted");
    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.undo(None, false).await.expect("loose undo");

    let Event::Turn(TurnEvent::Started {
        deadline: Some(restarted),
        ..
    }) = next_event(&mut turn_events, |event| {
        matches!(event, Event::Turn(TurnEvent::Started { turn_id: 0, .. }))
    })
    .await
    else {
        panic!("undo should re-announce turn 0");
    };
    assert!(restarted > opening);

    // The old deadline has not passed yet, let alone the new one.
    let early = handle.force_timeout(0).await.expect("timeout command");
    assert!(early.is_none());
    assert_eq!(
        handle.turn_deadline().await.expect("deadline query"),
        Some((0, Some(restarted)))
    );
    let state = handle.query_state().await.expect("state query");
    assert!(state.turns.is_empty());
    assert!(state.actions.is_empty());

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn test_turn_timer_keeps_up_with_a_tiny_event_buffer() {
    let mut config = GameConfig::default().with_turn_time_limit(1);
    config.passed_turn_limit = 0;
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            event_buffer_size: 1,
            ..RuntimeConfig::default()
        })
        .new_game("lagging", GameOptions::new(2).with_config(config))
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();
    seat_duel(&handle).await;
    for _ in 0..5 {
        handle
            .submit_action(ActionRequest::end_turn())
            .await
            .expect("pass should be accepted");
    }

    // Whether or not the timer missed announcements, it must close turn 5.
    let timed_out = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let state = handle.query_state().await.expect("state query");
            if state.turns.len() > 5 {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("turn 5 should time out");
    let forced = timed_out.turns[5].actions.last().expect("forced pass");
    assert!(forced.forced);

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn test_providers_drive_the_match() {
    let mut config = GameConfig::default();
    config.passed_turn_limit = 2;
    let mut runtime = Runtime::builder()
        .config(no_timer())
        .new_game("bots", GameOptions::new(2).with_config(config))
        .provider(TeamId(0), PassActionProvider)
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();
    seat_duel(&handle).await;

    assert!(runtime.step().await.expect("team 0 passes"));
    let err = runtime.step().await.expect_err("team 1 has no provider");
    assert!(matches!(err, RuntimeError::ProviderNotSet { team: TeamId(1) }));

    runtime.set_provider(TeamId(1), PassActionProvider);
    runtime.run().await.expect("match should run to completion");

    let state = handle.query_state().await.expect("state query");
    assert_eq!(state.phase(), Phase::Ended);
    assert_eq!(state.winner, Some(Winner::Draw));
    assert!(!runtime.step().await.expect("ended match does not step"));

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn test_changes_are_persisted_and_resumable() {
    let repository = Arc::new(InMemoryGameRepo::new());
    let runtime = Runtime::builder()
        .config(no_timer())
        .new_game("saved", GameOptions::new(2))
        .repository(repository.clone())
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();
    seat_duel(&handle).await;
    handle
        .submit_action(ActionRequest::end_turn())
        .await
        .expect("end turn");
    let live = handle.query_state().await.expect("state query");
    drop(handle);
    runtime.shutdown().await.expect("shutdown");

    let saved = repository
        .load("saved")
        .expect("repository load")
        .expect("game was saved");
    assert_eq!(saved, live);

    let resumed = Runtime::builder()
        .config(no_timer())
        .repository(repository.clone())
        .resume("saved")
        .build()
        .await
        .expect("resumed runtime should build");
    let state = resumed.handle().query_state().await.expect("state query");
    assert_eq!(state.turns.len(), 1);
    assert_eq!(state.current_team_id, TeamId(1));
    resumed.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn test_build_without_state_fails() {
    let result = Runtime::builder().build().await;
    assert!(matches!(result, Err(RuntimeError::MissingState)));
}

struct ScriptedProvider(Vec<ActionRequest>);

#[async_trait::async_trait]
impl ActionProvider for ScriptedProvider {
    async fn provide_actions(
        &self,
        _team: TeamId,
        state: &game_core::StateProjection,
    ) -> runtime::Result<Vec<ActionRequest>> {
        assert_eq!(state.viewer, Some(TeamId(0)));
        Ok(self.0.clone())
    }
}

#[tokio::test]
async fn test_provider_sees_its_own_projection() {
    let mut runtime = Runtime::builder()
        .config(no_timer())
        .new_game("scripted", GameOptions::new(2))
        .provider(
            TeamId(0),
            ScriptedProvider(vec![
                ActionRequest::turn(UnitId(1), Direction::South),
                ActionRequest::end_turn(),
            ]),
        )
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();
    seat_duel(&handle).await;

    runtime.step().await.expect("scripted turn");
    let turn = handle
        .turn_data(0)
        .await
        .expect("turn data query")
        .expect("turn 0 sealed");
    let kinds: Vec<_> = turn.actions.iter().map(|action| action.kind).collect();
    assert_eq!(kinds, vec![ActionKind::Turn, ActionKind::EndTurn]);

    drop(handle);
    runtime.shutdown().await.expect("shutdown");
}
