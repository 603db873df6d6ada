use std::fs;

use game_content::ContentFactory;
use game_core::{GameEngine, GameOptions, GameState, JoinRequest};

#[test]
fn loaded_content_starts_a_match() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "board_width = 7\nboard_height = 7\n").unwrap();
    fs::write(
        dir.path().join("sets.ron"),
        r#"[(name: "duo", units: [
            (kind: Knight, position: (x: 2, y: 6)),
            (kind: Scout, position: (x: 4, y: 6)),
        ])]"#,
    )
    .unwrap();

    let (config, sets) = ContentFactory::new(dir.path()).load_all().unwrap();
    let duo = sets.get("duo").unwrap().clone();

    let mut state = GameState::new("content", GameOptions::new(2).with_config(config)).unwrap();
    let mut engine = GameEngine::new(&mut state);
    engine
        .join(None, JoinRequest::new("a", "A", duo.clone()), 1)
        .unwrap();
    engine.join(None, JoinRequest::new("b", "B", duo), 2).unwrap();
    engine
        .start(chrono::DateTime::UNIX_EPOCH, None)
        .unwrap();
    assert_eq!(state.board.units().len(), 4);
}

#[test]
fn missing_files_report_their_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = ContentFactory::new(dir.path()).load_config().unwrap_err();
    assert!(format!("{err:#}").contains("config.toml"));
}
