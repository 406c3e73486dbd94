//! Property-based tests for the rules engine.
//!
//! These tests drive the engine with random maps and random command
//! sequences and check that no accepted or rejected command breaks a game
//! invariant.
//! Run with: cargo test --release prop_engine

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use frontier::game::{
    TerrainCounts, UnitCatalog, check_invariants, compute_reachable, generate_terrain,
};
use frontier::{CityRules, Coord, GameState, Map, Terrain, TerrainRatios, UnitKind};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// One player command, with indices resolved against the live state.
#[derive(Debug, Clone)]
enum Command {
    Spawn { kind: u8, x: u16, y: u16 },
    Move { unit: usize, x: u16, y: u16 },
    Attack { unit: usize, x: u16, y: u16 },
    Found { unit: usize },
    Grow { city: usize, population: u32 },
    Remove { city: usize },
    EndTurn,
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        (0u8..3, 0u16..10, 0u16..10).prop_map(|(kind, x, y)| Command::Spawn { kind, x, y }),
        (0usize..16, 0u16..10, 0u16..10).prop_map(|(unit, x, y)| Command::Move { unit, x, y }),
        (0usize..16, 0u16..10, 0u16..10).prop_map(|(unit, x, y)| Command::Attack { unit, x, y }),
        (0usize..16).prop_map(|unit| Command::Found { unit }),
        (0usize..8, 0u32..12).prop_map(|(city, population)| Command::Grow { city, population }),
        (0usize..8).prop_map(|city| Command::Remove { city }),
        Just(Command::EndTurn),
    ]
}

fn terrain() -> impl Strategy<Value = Terrain> {
    prop::sample::select(Terrain::ALL.to_vec())
}

fn apply(state: &mut GameState, command: &Command) {
    let units: Vec<_> = state.units().map(|unit| unit.id).collect();
    let cities: Vec<_> = state.cities().map(|city| city.id).collect();
    let current = state.current_player();

    match *command {
        Command::Spawn { kind, x, y } => {
            let kind = UnitKind::ALL[usize::from(kind)];
            let _ = state.spawn_unit(current, kind, Coord::new(x, y));
        }
        Command::Move { unit, x, y } => {
            if let Some(&id) = units.get(unit) {
                let _ = state.move_unit(id, Coord::new(x, y));
            }
        }
        Command::Attack { unit, x, y } => {
            if let Some(&id) = units.get(unit) {
                let _ = state.attack_at(id, Coord::new(x, y));
            }
        }
        Command::Found { unit } => {
            if let Some(&id) = units.get(unit) {
                let _ = state.found_city(id);
            }
        }
        Command::Grow { city, population } => {
            if let Some(&id) = cities.get(city) {
                state.set_city_population(id, population).unwrap();
            }
        }
        Command::Remove { city } => {
            if let Some(&id) = cities.get(city) {
                state.remove_city(id).unwrap();
            }
        }
        Command::EndTurn => {
            state.end_turn(current).unwrap();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// No command sequence leaves the game inconsistent.
    #[test]
    fn prop_commands_preserve_invariants(
        tiles in prop::collection::vec(terrain(), 100),
        commands in prop::collection::vec(command(), 1..80),
        radius in 1u16..3,
    ) {
        let map = Map::from_terrain(10, 10, &tiles).unwrap();
        let rules = CityRules { work_radius: radius, min_spacing: 2 };
        let mut state = GameState::new(map, [1, 2, 3], UnitCatalog::default(), rules);

        for command in &commands {
            apply(&mut state, command);
            let violations = check_invariants(&state);
            prop_assert!(violations.is_empty(), "after {:?}: {:?}", command, violations);
        }
    }

    /// Every reachable tile has a path of cost within the unit's budget, and
    /// moving there spends exactly that cost.
    #[test]
    fn prop_reachable_paths_are_walkable(
        tiles in prop::collection::vec(terrain(), 144),
        x in 0u16..12,
        y in 0u16..12,
        kind in 0usize..3,
        pick in any::<prop::sample::Index>(),
    ) {
        let map = Map::from_terrain(12, 12, &tiles).unwrap();
        let mut state = GameState::new(map, [1], UnitCatalog::default(), CityRules::default());
        let start = Coord::new(x, y);
        let Ok(id) = state.spawn_unit(1, UnitKind::ALL[kind], start) else {
            return Ok(());
        };
        let unit = state.unit(id).unwrap();
        let reach = compute_reachable(state.map(), unit);

        for &tile in &reach.tiles {
            let path = reach.path(tile).unwrap();
            prop_assert_eq!(path.first(), Some(&start));
            prop_assert_eq!(path.last(), Some(&tile));
            let cost = reach.cost(tile).unwrap();
            prop_assert_eq!(usize::try_from(cost).unwrap(), path.len() - 1);
            prop_assert!(cost <= unit.moves);
            for step in path.windows(2) {
                prop_assert!(step[0].is_orthogonally_adjacent(step[1]));
                prop_assert!(state.map().is_passable(step[1]));
            }
        }

        if reach.is_empty() {
            return Ok(());
        }
        let before = unit.moves;
        let target = reach.tiles[pick.index(reach.len())];
        let cost = reach.cost(target).unwrap();
        state.move_unit(id, target).unwrap();
        let moved = state.unit(id).unwrap();
        prop_assert_eq!(moved.position, target);
        prop_assert_eq!(moved.moves, before - cost);
    }

    /// Population changes keep every city's claims contiguous and exclusive.
    #[test]
    fn prop_city_claims_track_population(
        populations in prop::collection::vec((0usize..3, 0u32..15), 1..40),
    ) {
        let mut state = GameState::new(
            Map::new(12, 12).unwrap(),
            [1, 2],
            UnitCatalog::default(),
            CityRules { work_radius: 2, min_spacing: 2 },
        );
        let mut cities = Vec::new();
        for x in [2, 5, 8] {
            let settler = state.spawn_unit(1, UnitKind::Settler, Coord::new(x, 6)).unwrap();
            cities.push(state.found_city(settler).unwrap());
        }

        for (index, population) in populations {
            let id = cities[index];
            state.set_city_population(id, population).unwrap();
            let city = state.city(id).unwrap();
            prop_assert!(city.worked.len() <= city.population as usize);
            prop_assert_eq!(city.worked.first(), Some(&city.position));
            let violations = check_invariants(&state);
            prop_assert!(violations.is_empty(), "{:?}", violations);
        }
    }

    /// Generated maps have the requested size and every tile is counted.
    #[test]
    fn prop_generated_maps_in_bounds(
        width in 1u16..40,
        height in 1u16..40,
        seed in any::<u64>(),
        passes in 0u32..6,
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let map = generate_terrain(width, height, &TerrainRatios::default(), passes, &mut rng)
            .unwrap();
        let counts = TerrainCounts::of(&map);

        prop_assert_eq!(map.width(), width);
        prop_assert_eq!(map.height(), height);
        prop_assert_eq!(counts.total(), map.area());
    }
}
