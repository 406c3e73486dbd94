#![no_main]

//! City claim fuzzer.
//!
//! Founds several cities on an arbitrary terrain grid and applies arbitrary
//! population changes and removals. Claims must stay exclusive, contiguous
//! and in step with each city's worked list.

use arbitrary::Arbitrary;
use frontier::game::{UnitCatalog, check_invariants};
use frontier::{CityRules, Coord, GameState, Map, Terrain, UnitKind};
use libfuzzer_sys::fuzz_target;

const SIDE: u16 = 12;

#[derive(Arbitrary, Debug)]
struct ClaimInput {
    /// Terrain indices, wrapped onto the terrain list.
    terrain: Vec<u8>,
    /// Work radius, wrapped to 1..=3.
    radius: u8,
    /// Minimum spacing, wrapped to 0..=3.
    spacing: u8,
    /// City sites to try.
    sites: Vec<(u8, u8, u8)>,
    /// (city index, population) changes; population 0 removes the city.
    changes: Vec<(u8, u8)>,
}

fuzz_target!(|input: ClaimInput| {
    let area = usize::from(SIDE) * usize::from(SIDE);
    let tiles: Vec<Terrain> = (0..area)
        .map(|i| {
            let index = input.terrain.get(i).copied().unwrap_or(0);
            Terrain::ALL[usize::from(index) % Terrain::ALL.len()]
        })
        .collect();
    let Some(map) = Map::from_terrain(SIDE, SIDE, &tiles) else {
        return;
    };
    let rules = CityRules {
        work_radius: 1 + u16::from(input.radius % 3),
        min_spacing: u16::from(input.spacing % 4),
    };
    let mut state = GameState::new(map, [1, 2], UnitCatalog::default(), rules);

    for &(x, y, owner) in input.sites.iter().take(12) {
        let position = Coord::new(u16::from(x) % SIDE, u16::from(y) % SIDE);
        let owner = 1 + owner % 2;
        while state.current_player() != owner {
            let current = state.current_player();
            let _ = state.end_turn(current);
        }
        if let Ok(settler) = state.spawn_unit(owner, UnitKind::Settler, position) {
            let _ = state.found_city(settler);
        }
    }

    for &(index, population) in input.changes.iter().take(64) {
        let cities: Vec<_> = state.cities().map(|city| city.id).collect();
        if cities.is_empty() {
            break;
        }
        let id = cities[usize::from(index) % cities.len()];
        if population == 0 {
            let _ = state.remove_city(id);
        } else {
            let _ = state.set_city_population(id, u32::from(population % 40));
        }

        let violations = check_invariants(&state);
        assert!(violations.is_empty(), "Invariants violated: {violations:?}");
    }
});
