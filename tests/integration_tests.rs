//! Integration tests for game sessions, placement and pacing

use std::io::Write;

use hexstack::core::{GameState, GameStatus, ObstaclePlacement, RulesConfig};
use hexstack::engine::{apply_place, autoplay, autoplay_paced, PacedDriver, PacingConfig, PlaceError};
use hexstack::types::{CascadeEvent, Color, Hex, ObstacleKind};

#[test]
fn test_game_lifecycle() {
    let mut state = GameState::new(RulesConfig::default(), 12345).unwrap();
    assert_eq!(state.status(), GameStatus::Playing);
    assert!(state.is_playable());

    let resolution = apply_place(&mut state, 0, Hex::ORIGIN).unwrap();
    assert!(resolution.steps >= 1);
    assert_eq!(state.moves(), 1);
    assert!(!state.board().get(Hex::ORIGIN).unwrap().is_empty() || resolution.eliminated > 0);
}

#[test]
fn test_goal_reached_wins_once_and_blocks_placement() {
    let rules = RulesConfig {
        goal: 10,
        ..RulesConfig::default()
    };
    let mut state = GameState::new(rules, 8).unwrap();
    // A full run waiting far from the placement: the failsafe eliminates it.
    state
        .board_mut()
        .set_stack(Hex::new(2, -2), vec![Color::Purple; 10])
        .unwrap();

    let resolution = apply_place(&mut state, 0, Hex::new(-2, 2)).unwrap();
    let wins = resolution
        .events
        .iter()
        .filter(|ev| matches!(ev, CascadeEvent::Won { .. }))
        .count();
    assert_eq!(wins, 1);
    assert!(resolution.won());
    assert_eq!(state.status(), GameStatus::Won);

    let err = apply_place(&mut state, 1, Hex::ORIGIN).unwrap_err();
    assert_eq!(err, PlaceError::NotPlayable);
    assert_eq!(err.code(), "not_playable");
    assert!(!state.mulligan());
}

#[test]
fn test_filling_the_board_loses() {
    let rules = RulesConfig {
        radius: 1,
        ..RulesConfig::default()
    };
    let mut state = GameState::new(rules, 3).unwrap();
    let summary = autoplay(&mut state, 1_000).unwrap();

    assert_ne!(state.status(), GameStatus::Playing);
    if state.status() == GameStatus::Lost {
        assert!(state.board().is_full());
    }
    assert_eq!(summary.moves, state.moves());
    assert_eq!(
        apply_place(&mut state, 0, Hex::ORIGIN).unwrap_err(),
        PlaceError::NotPlayable
    );
}

#[test]
fn test_obstacles_block_placement_and_survive_reset() {
    let rules = RulesConfig {
        obstacles: vec![
            ObstaclePlacement {
                q: 1,
                r: 0,
                kind: ObstacleKind::Crack,
            },
            ObstaclePlacement {
                q: -1,
                r: 1,
                kind: ObstacleKind::Valve,
            },
        ],
        ..RulesConfig::default()
    };
    let mut state = GameState::new(rules, 4).unwrap();
    assert_eq!(
        apply_place(&mut state, 0, Hex::new(1, 0)).unwrap_err(),
        PlaceError::Obstacle(Hex::new(1, 0))
    );

    apply_place(&mut state, 0, Hex::ORIGIN).unwrap();
    state.reset();
    assert!(state.board().is_obstacle(Hex::new(1, 0)));
    assert!(state.board().is_obstacle(Hex::new(-1, 1)));
    assert_eq!(state.board().total_chips(), 0);
    assert_eq!(state.episode_id(), 1);
}

#[test]
fn test_same_seed_same_game() {
    let mut a = GameState::new(RulesConfig::for_radius(3), 2024).unwrap();
    let mut b = GameState::new(RulesConfig::for_radius(3), 2024).unwrap();
    autoplay(&mut a, 40).unwrap();
    autoplay(&mut b, 40).unwrap();

    let sa = a.snapshot();
    let sb = b.snapshot();
    assert_eq!(sa, sb);
    assert_eq!(sa.state_hash(), sb.state_hash());
    assert_eq!(
        serde_json::to_string(&sa).unwrap(),
        serde_json::to_string(&sb).unwrap()
    );
}

#[test]
fn test_different_seeds_deal_differently() {
    let hands: Vec<_> = (1..=5)
        .map(|seed| {
            GameState::new(RulesConfig::default(), seed)
                .unwrap()
                .snapshot()
                .hand
        })
        .collect();
    assert!(hands.windows(2).any(|w| w[0] != w[1]));
}

#[test]
fn test_snapshot_json_shape() {
    let state = GameState::new(RulesConfig::default(), 1).unwrap();
    let value: serde_json::Value = serde_json::to_value(state.snapshot()).unwrap();
    assert_eq!(value["status"], "playing");
    assert_eq!(value["cells"].as_array().unwrap().len(), 19);
    assert_eq!(value["hand"].as_array().unwrap().len(), 3);
    assert_eq!(value["busy"], false);
}

#[test]
fn test_rules_from_file() {
    let path = std::env::temp_dir().join(format!("hexstack-rules-{}.json", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{ "radius": 4, "goal": 300, "obstacles": [{{ "q": 0, "r": 0, "kind": "core" }}] }}"#
        )
        .unwrap();
    }

    let rules = RulesConfig::from_path(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let state = GameState::new(rules, 1).unwrap();
    assert_eq!(state.board().len(), 61);
    assert!(state.board().is_obstacle(Hex::ORIGIN));
    assert_eq!(state.scoring().goal(), 300);
}

#[test]
fn test_paced_driver_matches_instant_play() {
    let rules = RulesConfig::default();
    let mut direct = GameState::new(rules.clone(), 55).unwrap();
    autoplay(&mut direct, 15).unwrap();

    // Real delays, sped up enough to keep the test fast.
    let driver = PacedDriver::new(
        GameState::new(rules, 55).unwrap(),
        PacingConfig::default().with_speed(10_000),
    );
    tokio_test::block_on(async {
        autoplay_paced(&driver, 15).await.unwrap();
        let paced = driver.game().read().await.snapshot();
        assert_eq!(paced, direct.snapshot());
    });
}
