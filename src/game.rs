//! Rules engine for frontier.
//!
//! Implements the game rules:
//! - Procedural terrain generation
//! - Map with tiles, claims and occupants
//! - Cities that claim contiguous tiles as they grow
//! - Units with breadth-first movement, combat and capture
//! - Turn and round bookkeeping

mod city;
mod combat;
mod invariants;
mod map;
mod mapgen;
mod movement;
mod player;
mod state;
mod turn;
mod unit;

pub use city::{City, CityId};
pub use combat::{AttackOutcome, Resolution, resolve_attack, validate_attack};
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
pub use map::{Claim, Coord, Map, Terrain, Tile, Yield};
pub use mapgen::{
    TerrainCounts, find_passable_tile, find_starting_tiles, generate_map, generate_terrain,
};
pub use movement::{Reachability, can_found_city, compute_reachable};
pub use player::{Player, PlayerId, Resources};
pub use state::GameState;
pub use turn::{TurnOutcome, TurnState};
pub use unit::{Capabilities, Unit, UnitCatalog, UnitId, UnitKind, UnitStats};
