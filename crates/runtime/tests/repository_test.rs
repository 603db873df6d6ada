use chrono::{DateTime, Utc};
use game_core::{
    ActionRequest, Direction, GameEngine, GameOptions, GameState, JoinRequest, Position, SetUnit,
    TeamSet, UnitId, UnitKind,
};
use runtime::{FileGameRepository, GameRepository, InMemoryGameRepo, RepositoryError};

fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + seconds, 0).unwrap()
}

fn played(id: &str) -> GameState {
    let set = TeamSet {
        name: "duel".into(),
        units: vec![SetUnit {
            kind: UnitKind::Knight,
            position: Position::new(5, 9),
            direction: Direction::North,
        }],
    };
    let mut state = GameState::new(id, GameOptions::new(2)).unwrap();
    let mut engine = GameEngine::new(&mut state);
    engine
        .join(None, JoinRequest::new("alice", "Alice", set.clone()), 11)
        .unwrap();
    engine
        .join(None, JoinRequest::new("bob", "Bob", set), 12)
        .unwrap();
    engine.start(at(0), None).unwrap();
    engine
        .submit_action(&ActionRequest::turn(UnitId(1), Direction::East), at(3))
        .unwrap();
    engine.submit_action(&ActionRequest::end_turn(), at(4)).unwrap();
    state
}

fn exercise(repository: &dyn GameRepository) {
    let state = played("match-1");
    assert!(!repository.exists("match-1"));
    repository.save(&state).unwrap();
    assert!(repository.exists("match-1"));

    let loaded = repository.load("match-1").unwrap().unwrap();
    assert_eq!(loaded, state);
    assert_eq!(loaded.turns[0].started_at, at(0));
    assert_eq!(loaded.state_digest().unwrap(), state.state_digest().unwrap());

    repository.save(&played("match-0")).unwrap();
    assert_eq!(repository.list_ids().unwrap(), vec!["match-0", "match-1"]);

    repository.delete("match-1").unwrap();
    repository.delete("match-1").unwrap();
    assert!(repository.load("match-1").unwrap().is_none());
}

#[test]
fn test_in_memory_repository() {
    exercise(&InMemoryGameRepo::new());
}

#[test]
fn test_file_repository_round_trips_json() {
    let dir = tempfile::tempdir().unwrap();
    let repository = FileGameRepository::new(dir.path()).unwrap();
    exercise(&repository);

    let raw = std::fs::read_to_string(dir.path().join("match-0.json")).unwrap();
    assert!(raw.contains("2023-11-14T22:13:20Z"));
    assert!(!dir.path().join("match-0.json.tmp").exists());
}

#[test]
fn test_file_repository_rejects_path_ids() {
    let dir = tempfile::tempdir().unwrap();
    let repository = FileGameRepository::new(dir.path()).unwrap();
    assert!(matches!(
        repository.load("../escape"),
        Err(RepositoryError::InvalidId(_))
    ));
}
