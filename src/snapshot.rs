//! Whole-game snapshots.
//!
//! A snapshot is plain data: terrain, units, cities, players and turn
//! bookkeeping. Tile claims and occupants are derived on restore from the
//! cities' worked tiles and the units' positions, so they are never stored.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write as IoWrite};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::CityRules;
use crate::error::SnapshotError;
use crate::game::{
    City, CityId, GameState, Map, Player, PlayerId, Terrain, TurnState, Unit, UnitCatalog,
    UnitId, check_invariants,
};

/// Terrain grid in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSnapshot {
    /// Width in tiles.
    pub width: u16,
    /// Height in tiles.
    pub height: u16,
    /// One terrain per tile, row by row.
    pub terrain: Vec<Terrain>,
}

/// Serializable record of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Terrain.
    pub map: MapSnapshot,
    /// Units in id order.
    pub units: Vec<Unit>,
    /// Players keyed by id.
    pub players: BTreeMap<PlayerId, Player>,
    /// Player whose turn it is.
    pub current_player: PlayerId,
    /// Round number.
    pub turn: u32,
    /// Cities in founding order.
    #[serde(default)]
    pub cities: Vec<City>,
    /// Players that ended their turn this round.
    #[serde(default)]
    pub finished: Vec<PlayerId>,
    /// Next unit id to hand out; 0 means derive from the units.
    #[serde(default)]
    pub next_unit_id: UnitId,
    /// Next city id to hand out; 0 means derive from the cities.
    #[serde(default)]
    pub next_city_id: CityId,
    /// Stat table for future spawns.
    #[serde(default)]
    pub catalog: UnitCatalog,
    /// City rules in force.
    #[serde(default)]
    pub rules: CityRules,
    /// Map seed, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Snapshot {
    /// Encode as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] if encoding fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the snapshot to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a snapshot from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl GameState {
    /// Capture the full game state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            map: MapSnapshot {
                width: self.map.width(),
                height: self.map.height(),
                terrain: self.map.tiles().iter().map(|tile| tile.terrain).collect(),
            },
            units: self.units.values().cloned().collect(),
            players: self.players.clone(),
            current_player: self.turns.current(),
            turn: self.turns.round(),
            cities: self.cities.values().cloned().collect(),
            finished: self.turns.finished().iter().copied().collect(),
            next_unit_id: self.next_unit_id,
            next_city_id: self.next_city_id,
            catalog: self.catalog.clone(),
            rules: self.rules,
            seed: self.seed,
        }
    }

    /// Rebuild a game from a snapshot.
    ///
    /// Claims are re-derived from each city's worked tiles and occupants from
    /// unit positions. The result must pass [`check_invariants`].
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Invalid`] if the snapshot describes an
    /// impossible game.
    pub fn restore(snapshot: Snapshot) -> Result<Self, SnapshotError> {
        let Snapshot {
            map: grid,
            units,
            players,
            current_player,
            turn,
            cities,
            finished,
            next_unit_id,
            next_city_id,
            catalog,
            rules,
            seed,
        } = snapshot;

        let mut map = Map::from_terrain(grid.width, grid.height, &grid.terrain).ok_or_else(|| {
            SnapshotError::Invalid(format!(
                "{} terrain entries do not fill a {}x{} map",
                grid.terrain.len(),
                grid.width,
                grid.height
            ))
        })?;

        let mut unit_table = BTreeMap::new();
        for unit in units {
            if !map.in_bounds(unit.position) {
                return Err(SnapshotError::Invalid(format!(
                    "unit {} stands off the map at {}",
                    unit.id, unit.position
                )));
            }
            if let Some(other) = map.occupant(unit.position) {
                return Err(SnapshotError::Invalid(format!(
                    "units {other} and {} share {}",
                    unit.id, unit.position
                )));
            }
            map.set_occupant(unit.position, unit.id);
            if let Some(duplicate) = unit_table.insert(unit.id, unit) {
                return Err(SnapshotError::Invalid(format!(
                    "unit id {} appears twice",
                    duplicate.id
                )));
            }
        }

        let mut city_table = BTreeMap::new();
        for city in cities {
            if city.worked.first() != Some(&city.position) {
                return Err(SnapshotError::Invalid(format!(
                    "city {} does not work its center first",
                    city.id
                )));
            }
            map.force_claim(city.position, city.id, city.owner);
            for &coord in &city.worked[1..] {
                map.claim(coord, city.id, city.owner).map_err(|err| {
                    SnapshotError::Invalid(format!("city {}: {err}", city.id))
                })?;
            }
            if let Some(duplicate) = city_table.insert(city.id, city) {
                return Err(SnapshotError::Invalid(format!(
                    "city id {} appears twice",
                    duplicate.id
                )));
            }
        }

        let turns = TurnState::restore(players.keys().copied(), turn, current_player, finished);
        let next_unit_id = next_free_id(unit_table.keys().next_back(), "unit")?.max(next_unit_id);
        let next_city_id = next_free_id(city_table.keys().next_back(), "city")?.max(next_city_id);

        let state = GameState {
            map,
            units: unit_table,
            cities: city_table,
            players,
            turns,
            catalog,
            rules,
            next_unit_id,
            next_city_id,
            seed,
        };

        let violations = check_invariants(&state);
        if !violations.is_empty() {
            let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
            return Err(SnapshotError::Invalid(messages.join("; ")));
        }
        Ok(state)
    }

    /// Save a snapshot of this game.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        self.snapshot().save(path)
    }

    /// Load and restore a game.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, decoded or restored.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        Self::restore(Snapshot::load(path)?)
    }
}

/// Id after the highest one in use, or 1 for an empty table.
fn next_free_id(highest: Option<&u32>, what: &str) -> Result<u32, SnapshotError> {
    match highest {
        None => Ok(1),
        Some(&max) => max.checked_add(1).ok_or_else(|| {
            SnapshotError::Invalid(format!("{what} id {max} leaves no id for new {what}s"))
        }),
    }
}
