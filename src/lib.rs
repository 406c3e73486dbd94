// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Frontier: a deterministic rules engine for a turn-based grid strategy game.
//!
//! This crate provides the simulation core, with no rendering or input
//! handling:
//! - Seeded procedural terrain generation
//! - Cities that claim contiguous tiles as their population changes
//! - Unit movement with breadth-first reachability
//! - Combat, capture and turn/round bookkeeping
//! - JSON snapshots of the whole game
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   GameState (commands / queries)    │
//! ├──────────────┬──────────────────────┤
//! │ units/combat │ cities / claims      │
//! ├──────────────┴──────────────────────┤
//! │    Map store  ←  terrain generator  │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use frontier::{GameConfig, GameState};
//!
//! let mut config = GameConfig::default();
//! config.map.seed = Some(7);
//! let mut game = GameState::new_game(&config).unwrap();
//!
//! let settler = game.player(1).unwrap().unit_ids[0];
//! let city = game.found_city(settler).unwrap();
//! game.set_city_population(city, 3).unwrap();
//! assert!(frontier::game::check_invariants(&game).is_empty());
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod snapshot;

pub use config::{CityRules, GameConfig, MapConfig, TerrainRatios};
pub use error::{ActionError, ClaimError, ConfigError, ConstructionError, SnapshotError};
pub use snapshot::{MapSnapshot, Snapshot};

// Re-export key game types at crate root for convenience
pub use game::{
    City, CityId, Coord, GameState, Map, Player, PlayerId, Terrain, Tile, TurnOutcome, Unit,
    UnitId, UnitKind,
};
