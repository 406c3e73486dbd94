//! Multi-round integration tests for the rules engine.
//!
//! These tests play short games through the public API and check that every
//! command leaves the state consistent.
//!
//! Run with: cargo test --release game_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use frontier::game::{Resolution, UnitCatalog, UnitStats, check_invariants};
use frontier::{
    ActionError, CityRules, Coord, GameConfig, GameState, Map, Snapshot, Terrain, TurnOutcome,
    UnitKind,
};

fn open_game() -> GameState {
    GameState::new(
        Map::new(12, 12).unwrap(),
        [1, 2],
        UnitCatalog::default(),
        CityRules::default(),
    )
}

fn assert_consistent(state: &GameState) {
    let violations = check_invariants(state);
    assert!(violations.is_empty(), "invariants violated: {violations:?}");
}

/// End both players' turns, starting a new round.
fn finish_round(state: &mut GameState) {
    assert_eq!(
        state.end_turn(1).unwrap(),
        TurnOutcome::Passed { next: 2 }
    );
    assert!(matches!(
        state.end_turn(2).unwrap(),
        TurnOutcome::RoundAdvanced { .. }
    ));
}

#[test]
fn test_settle_and_grow() {
    let mut state = open_game();
    let settler = state.spawn_unit(1, UnitKind::Settler, Coord::new(3, 3)).unwrap();

    state.move_unit(settler, Coord::new(5, 3)).unwrap();
    assert_eq!(state.unit(settler).unwrap().moves, 0);
    assert_consistent(&state);

    let city = state.found_city(settler).unwrap();
    assert!(state.unit(settler).is_none());
    assert_eq!(state.city_at(Coord::new(5, 3)).unwrap().id, city);

    for population in [2, 5, 9, 3, 1] {
        state.set_city_population(city, population).unwrap();
        let worked = state.city(city).unwrap().worked.len();
        assert_eq!(worked, usize::try_from(population).unwrap());
        assert_consistent(&state);
    }

    let player = state.player(1).unwrap();
    assert!(player.unit_ids.is_empty());
    assert_eq!(player.city_ids, vec![city]);
}

#[test]
fn test_rounds_rotate_and_reset_moves() {
    let mut state = open_game();
    let red = state.spawn_unit(1, UnitKind::Warrior, Coord::new(1, 1)).unwrap();
    let blue = state.spawn_unit(2, UnitKind::Warrior, Coord::new(10, 10)).unwrap();

    for round in 1..=5 {
        assert_eq!(state.round(), round);
        assert_eq!(state.current_player(), 1);
        assert!(matches!(
            state.move_unit(blue, Coord::new(10, 9)),
            Err(ActionError::NotYourTurn { owner: 2, current: 1 })
        ));

        let x = u16::try_from(round).unwrap();
        state.move_along(red, &[Coord::new(x + 1, 1)]).unwrap();
        assert_eq!(state.unit(red).unwrap().moves, 3);

        assert_eq!(state.end_turn(1).unwrap(), TurnOutcome::Passed { next: 2 });
        assert_eq!(state.current_player(), 2);
        assert_eq!(
            state.end_turn(2).unwrap(),
            TurnOutcome::RoundAdvanced { round: round + 1 }
        );
        assert_eq!(state.unit(red).unwrap().moves, 4);
        assert_consistent(&state);
    }
}

#[test]
fn test_melee_duel_until_destroyed() {
    let mut state = open_game();
    let attacker = state.spawn_unit(1, UnitKind::Warrior, Coord::new(4, 4)).unwrap();
    let defender = state.spawn_unit(2, UnitKind::Warrior, Coord::new(5, 4)).unwrap();

    for expected_hp in [75, 50, 25] {
        let outcome = state.attack(attacker, defender).unwrap();
        assert_eq!(outcome.resolution, Resolution::Damaged { hp: expected_hp });
        assert_eq!(
            state.attack(attacker, defender),
            Err(ActionError::InsufficientMoves {
                needed: 1,
                available: 0
            })
        );
        finish_round(&mut state);
    }

    let outcome = state.attack_at(attacker, Coord::new(5, 4)).unwrap();
    assert_eq!(outcome.resolution, Resolution::Destroyed);
    assert!(state.unit(defender).is_none());
    assert!(state.unit_at(Coord::new(5, 4)).is_none());
    assert!(state.player(2).unwrap().unit_ids.is_empty());
    assert_consistent(&state);
}

#[test]
fn test_settler_captured_and_used() {
    let mut catalog = UnitCatalog::default();
    catalog.insert(
        UnitKind::Archer,
        UnitStats {
            move_points: 2,
            hp: 80,
            attack: 100,
            range: 2,
        },
    );
    let mut state = GameState::new(Map::new(12, 12).unwrap(), [1, 2], catalog, CityRules::default());
    let archer = state.spawn_unit(1, UnitKind::Archer, Coord::new(2, 6)).unwrap();
    let settler = state.spawn_unit(2, UnitKind::Settler, Coord::new(4, 6)).unwrap();

    let outcome = state.attack(archer, settler).unwrap();
    assert_eq!(outcome.resolution, Resolution::Captured { from: 2, to: 1 });

    let captured = state.unit(settler).unwrap();
    assert_eq!(captured.owner, 1);
    assert_eq!(captured.hp, 100);
    assert_eq!(captured.moves, 0);
    assert!(state.player(1).unwrap().unit_ids.contains(&settler));
    assert!(!state.player(2).unwrap().unit_ids.contains(&settler));
    assert_consistent(&state);

    finish_round(&mut state);
    let city = state.found_city(settler).unwrap();
    assert_eq!(state.city(city).unwrap().owner, 1);
    assert_consistent(&state);
}

#[test]
fn test_walls_and_budgets() {
    let mut map = Map::new(7, 5).unwrap();
    for y in 0..5 {
        assert!(map.set_terrain(Coord::new(3, y), Terrain::Mountain));
    }
    let mut state = GameState::new(map, [1, 2], UnitCatalog::default(), CityRules::default());
    let settler = state.spawn_unit(1, UnitKind::Settler, Coord::new(0, 2)).unwrap();

    assert_eq!(
        state.move_unit(settler, Coord::new(5, 2)),
        Err(ActionError::NoPath)
    );
    assert_eq!(
        state.move_unit(settler, Coord::new(2, 0)),
        Err(ActionError::InsufficientMoves {
            needed: 4,
            available: 2
        })
    );
    assert_eq!(
        state.move_unit(settler, Coord::new(3, 2)),
        Err(ActionError::TileNotAllowed(Coord::new(3, 2)))
    );

    let reach = state.reachable(settler).unwrap();
    assert!(reach.tiles.iter().all(|&coord| coord.x < 3));
    assert_eq!(reach.cost(Coord::new(2, 2)), Some(2));
    assert_consistent(&state);
}

#[test]
fn test_cities_keep_their_distance() {
    let mut state = open_game();
    let first = state.spawn_unit(1, UnitKind::Settler, Coord::new(4, 4)).unwrap();
    let second = state.spawn_unit(1, UnitKind::Settler, Coord::new(6, 4)).unwrap();
    let third = state.spawn_unit(1, UnitKind::Settler, Coord::new(9, 4)).unwrap();

    let city = state.found_city(first).unwrap();
    assert!(matches!(
        state.found_city(second),
        Err(ActionError::TooCloseToCity { .. })
    ));
    assert!(state.found_city(third).is_ok());

    state.remove_city(city).unwrap();
    assert!(state.found_city(second).is_ok());
    assert_consistent(&state);
}

#[test]
fn test_snapshot_file_roundtrip_mid_game() {
    let mut state = open_game();
    let settler = state.spawn_unit(1, UnitKind::Settler, Coord::new(2, 2)).unwrap();
    let warrior = state.spawn_unit(2, UnitKind::Warrior, Coord::new(9, 9)).unwrap();
    let city = state.found_city(settler).unwrap();
    state.set_city_population(city, 4).unwrap();
    state.end_turn(1).unwrap();
    state.move_unit(warrior, Coord::new(8, 8)).unwrap();

    let file = tempfile::NamedTempFile::new().unwrap();
    state.save(file.path()).unwrap();
    let restored = GameState::load(file.path()).unwrap();

    assert_eq!(restored.snapshot(), state.snapshot());
    assert_eq!(restored.current_player(), 2);
    assert!(restored.turns().has_finished(1));
    assert_eq!(restored.unit(warrior).unwrap().moves, 2);
    assert_eq!(
        restored.map().claim_of(Coord::new(2, 2)),
        state.map().claim_of(Coord::new(2, 2))
    );
    assert_consistent(&restored);

    let reparsed = Snapshot::from_json(&state.snapshot().to_json().unwrap()).unwrap();
    assert_eq!(reparsed, state.snapshot());
}

#[test]
fn test_new_game_is_deterministic_per_seed() {
    let mut config = GameConfig::default();
    config.map.seed = Some(2024);
    config.players = 4;

    let first = GameState::new_game(&config).unwrap();
    let second = GameState::new_game(&config).unwrap();
    assert_eq!(first.snapshot(), second.snapshot());
    assert_eq!(first.units().count(), 4);
    assert_consistent(&first);

    for unit in first.units() {
        assert_eq!(unit.kind, UnitKind::Settler);
        assert!(first.map().is_passable(unit.position));
    }
}

#[test]
fn test_many_seeded_games_stay_consistent() {
    let mut config = GameConfig::default();
    for seed in 0..25 {
        config.map.seed = Some(seed);
        let mut state = GameState::new_game(&config).unwrap();
        let settlers: Vec<_> = state.units().map(|unit| (unit.id, unit.owner)).collect();

        for (id, owner) in settlers {
            while state.current_player() != owner {
                let current = state.current_player();
                state.end_turn(current).unwrap();
            }
            if let Ok(city) = state.found_city(id) {
                state.set_city_population(city, 3).unwrap();
            }
            assert_consistent(&state);
        }
    }
}
