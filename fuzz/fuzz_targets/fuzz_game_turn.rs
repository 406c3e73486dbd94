#![no_main]

//! Full game turn fuzzer.
//!
//! This fuzz target drives a generated game through arbitrary command
//! sequences:
//! 1. Generate a map and starting settlers from the fuzzed seed
//! 2. Apply spawns, moves, attacks and city commands for whoever is current
//! 3. End turns and let rounds advance
//! 4. Round-trip the state through a snapshot
//!
//! Every rejected command must leave the state untouched, so the invariant
//! checker runs after each step.

use arbitrary::Arbitrary;
use frontier::game::check_invariants;
use frontier::{Coord, GameConfig, GameState, UnitKind};
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated command.
#[derive(Arbitrary, Debug, Clone)]
enum FuzzCommand {
    /// Spawn a unit for the current player.
    Spawn { kind: u8, x: u8, y: u8 },
    /// Move the n-th unit towards a tile.
    Move { unit: u8, x: u8, y: u8 },
    /// Walk the n-th unit along an explicit path.
    Walk { unit: u8, path: Vec<(u8, u8)> },
    /// Attack a tile with the n-th unit.
    Attack { unit: u8, x: u8, y: u8 },
    /// Found a city with the n-th unit.
    Found { unit: u8 },
    /// Change the population of the n-th city.
    Grow { city: u8, population: u8 },
    /// Remove the n-th city.
    Remove { city: u8 },
    /// End the current player's turn.
    EndTurn,
    /// End the turn automatically if the current player is out of moves.
    AutoEnd,
}

/// Structured input for full game fuzzing.
#[derive(Arbitrary, Debug)]
struct GameInput {
    /// Map seed.
    seed: u64,
    /// Map side length, wrapped to a small range.
    size: u8,
    /// Player count, wrapped to 1..=4.
    players: u8,
    /// Commands to apply in order.
    commands: Vec<FuzzCommand>,
}

fuzz_target!(|input: GameInput| {
    let side = 4 + u16::from(input.size % 16);
    let mut config = GameConfig::default();
    config.map.width = side;
    config.map.height = side;
    config.map.seed = Some(input.seed);
    config.players = 1 + input.players % 4;

    let Ok(mut state) = GameState::new_game(&config) else {
        return;
    };
    assert_clean(&state, "start");

    for command in input.commands.iter().take(64) {
        apply(&mut state, side, command);
        assert_clean(&state, &format!("{command:?}"));
    }

    let restored = GameState::restore(state.snapshot()).expect("snapshot must restore");
    assert_eq!(restored.snapshot(), state.snapshot());
});

fn assert_clean(state: &GameState, context: &str) {
    let violations = check_invariants(state);
    assert!(
        violations.is_empty(),
        "Invariants violated after {context}: {violations:?}"
    );
}

fn coord(x: u8, y: u8, side: u16) -> Coord {
    Coord::new(u16::from(x) % side, u16::from(y) % side)
}

fn nth<T: Copy>(items: &[T], n: u8) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    items.get(usize::from(n) % items.len()).copied()
}

/// Apply a fuzzer-generated command to the game state.
fn apply(state: &mut GameState, side: u16, command: &FuzzCommand) {
    let units: Vec<_> = state.units().map(|unit| unit.id).collect();
    let cities: Vec<_> = state.cities().map(|city| city.id).collect();
    let current = state.current_player();

    match command {
        FuzzCommand::Spawn { kind, x, y } => {
            let kind = UnitKind::ALL[usize::from(*kind) % UnitKind::ALL.len()];
            let _ = state.spawn_unit(current, kind, coord(*x, *y, side));
        }
        FuzzCommand::Move { unit, x, y } => {
            if let Some(id) = nth(&units, *unit) {
                let _ = state.move_unit(id, coord(*x, *y, side));
            }
        }
        FuzzCommand::Walk { unit, path } => {
            if let Some(id) = nth(&units, *unit) {
                let path: Vec<_> = path.iter().take(8).map(|&(x, y)| coord(x, y, side)).collect();
                let _ = state.move_along(id, &path);
            }
        }
        FuzzCommand::Attack { unit, x, y } => {
            if let Some(id) = nth(&units, *unit) {
                let _ = state.attack_at(id, coord(*x, *y, side));
            }
        }
        FuzzCommand::Found { unit } => {
            if let Some(id) = nth(&units, *unit) {
                let _ = state.found_city(id);
            }
        }
        FuzzCommand::Grow { city, population } => {
            if let Some(id) = nth(&cities, *city) {
                let _ = state.set_city_population(id, u32::from(*population % 32));
            }
        }
        FuzzCommand::Remove { city } => {
            if let Some(id) = nth(&cities, *city) {
                let _ = state.remove_city(id);
            }
        }
        FuzzCommand::EndTurn => {
            let _ = state.end_turn(current);
        }
        FuzzCommand::AutoEnd => {
            let _ = state.auto_end_on_exhaustion();
        }
    }
}
