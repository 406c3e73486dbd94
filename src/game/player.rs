//! Player state management.

use serde::{Deserialize, Serialize};

use crate::game::{CityId, Unit, UnitId};

/// Unique identifier for a player.
///
/// Turn order follows ascending player id.
pub type PlayerId = u8;

/// Resource counters. Accumulation policy lives outside the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// Stored food.
    pub food: i64,
    /// Stored production.
    pub production: i64,
    /// Stored gold.
    pub gold: i64,
}

/// State for a single player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier for this player.
    pub id: PlayerId,
    /// Whether a human controls this player.
    pub is_human: bool,
    /// Units owned by this player, in acquisition order.
    pub unit_ids: Vec<UnitId>,
    /// Cities owned by this player, in founding order.
    pub city_ids: Vec<CityId>,
    /// Resource counters.
    pub resources: Resources,
}

impl Player {
    /// Create a new human player with empty rosters.
    #[must_use]
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            is_human: true,
            unit_ids: Vec::new(),
            city_ids: Vec::new(),
            resources: Resources::default(),
        }
    }

    /// Add a unit to the roster; duplicates are ignored.
    pub fn add_unit(&mut self, unit: UnitId) {
        if !self.unit_ids.contains(&unit) {
            self.unit_ids.push(unit);
        }
    }

    /// Remove a unit from the roster.
    pub fn remove_unit(&mut self, unit: UnitId) {
        self.unit_ids.retain(|&id| id != unit);
    }

    /// Add a city to the roster; duplicates are ignored.
    pub fn add_city(&mut self, city: CityId) {
        if !self.city_ids.contains(&city) {
            self.city_ids.push(city);
        }
    }

    /// Remove a city from the roster.
    pub fn remove_city(&mut self, city: CityId) {
        self.city_ids.retain(|&id| id != city);
    }

    /// Check whether every unit this player owns has spent its movement points.
    ///
    /// A player without units is never out of moves.
    #[must_use]
    pub fn is_out_of_moves<'a>(&self, units: impl IntoIterator<Item = &'a Unit>) -> bool {
        let mut owned = units.into_iter().filter(|unit| unit.owner == self.id).peekable();
        if owned.peek().is_none() {
            return false;
        }
        owned.all(|unit| unit.moves == 0)
    }
}
