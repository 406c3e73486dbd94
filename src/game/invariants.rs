//! Game invariants - sanity checks that detect bugs.
//!
//! Commands keep these true on every path, so a violation always points at
//! an engine bug or a hand-edited snapshot. Tests and fuzz targets call
//! [`check_invariants`] after every command.

use std::collections::{HashMap, HashSet};

use crate::game::GameState;

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut report = |message: String| violations.push(InvariantViolation { message });

    // Map overlays point at live cities and units
    for (coord, tile) in state.map.iter() {
        if let Some(claim) = tile.claim {
            match state.cities.get(&claim.city) {
                None => report(format!("Tile {coord} claimed by missing city {}", claim.city)),
                Some(city) => {
                    if !city.is_working(coord) {
                        report(format!("Tile {coord} claimed by city {} but not worked", city.id));
                    }
                    if claim.player != city.owner {
                        report(format!(
                            "Tile {coord} claim names player {} but city {} belongs to {}",
                            claim.player, city.id, city.owner
                        ));
                    }
                }
            }
        }
        if let Some(id) = tile.occupant {
            match state.units.get(&id) {
                None => report(format!("Tile {coord} occupied by missing unit {id}")),
                Some(unit) if unit.position != coord => report(format!(
                    "Tile {coord} lists unit {id} which stands at {}",
                    unit.position
                )),
                Some(_) => {}
            }
        }
    }

    // Units
    let mut positions: HashMap<_, u32> = HashMap::new();
    for unit in state.units.values() {
        if let Some(other) = positions.insert(unit.position, unit.id) {
            report(format!(
                "Units {other} and {} share tile {}",
                unit.id, unit.position
            ));
        }
        if state.map.occupant(unit.position) != Some(unit.id) {
            report(format!(
                "Unit {} at {} is not recorded on the map",
                unit.id, unit.position
            ));
        }
        if unit.moves > unit.stats.move_points {
            report(format!(
                "Unit {} has {} moves > max {}",
                unit.id, unit.moves, unit.stats.move_points
            ));
        }
        if unit.hp == 0 || unit.hp > unit.stats.hp {
            report(format!(
                "Unit {} has hp {} outside 1..={}",
                unit.id, unit.hp, unit.stats.hp
            ));
        }
        match state.players.get(&unit.owner) {
            None => report(format!("Unit {} owned by missing player {}", unit.id, unit.owner)),
            Some(player) if !player.unit_ids.contains(&unit.id) => report(format!(
                "Unit {} missing from player {} roster",
                unit.id, unit.owner
            )),
            Some(_) => {}
        }
    }

    // Cities: center first, contiguity, exclusivity, claim agreement
    let mut worked_by: HashMap<_, u32> = HashMap::new();
    for city in state.cities.values() {
        if city.population == 0 {
            report(format!("City {} has zero population", city.id));
        }
        if city.worked.first() != Some(&city.position) {
            report(format!("City {} does not work its center first", city.id));
        }
        if city.worked.len() > city.population.max(1) as usize {
            report(format!(
                "City {} works {} tiles with population {}",
                city.id,
                city.worked.len(),
                city.population
            ));
        }
        for &coord in &city.worked {
            if let Some(other) = worked_by.insert(coord, city.id) {
                report(format!("Tile {coord} worked by cities {other} and {}", city.id));
            }
            if state.map.claim_of(coord).is_none_or(|claim| claim.city != city.id) {
                report(format!(
                    "City {} works {coord} without holding its claim",
                    city.id
                ));
            }
            let attached = coord == city.position
                || city
                    .worked
                    .iter()
                    .any(|other| other.is_moore_adjacent(coord));
            if !attached {
                report(format!("City {} works detached tile {coord}", city.id));
            }
        }
        match state.players.get(&city.owner) {
            None => report(format!("City {} owned by missing player {}", city.id, city.owner)),
            Some(player) if !player.city_ids.contains(&city.id) => report(format!(
                "City {} missing from player {} roster",
                city.id, city.owner
            )),
            Some(_) => {}
        }
    }

    // Rosters only list what the player owns
    for player in state.players.values() {
        let mut seen = HashSet::new();
        for id in &player.unit_ids {
            if !seen.insert(*id) {
                report(format!("Player {} lists unit {id} twice", player.id));
            }
            if state.units.get(id).is_none_or(|unit| unit.owner != player.id) {
                report(format!("Player {} lists unit {id} it does not own", player.id));
            }
        }
        for id in &player.city_ids {
            if state.cities.get(id).is_none_or(|city| city.owner != player.id) {
                report(format!("Player {} lists city {id} it does not own", player.id));
            }
        }
    }

    if !state.players.is_empty() && !state.players.contains_key(&state.current_player()) {
        report(format!(
            "Current player {} is not registered",
            state.current_player()
        ));
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(state: &GameState) {
    let violations = check_invariants(state);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_state: &GameState) {}
