//! Static game configuration.
//!
//! Every section has a default, so a JSON file only needs the keys it
//! overrides. The unit table is replaced as a whole when present.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::UnitCatalog;

/// Most players a game supports.
pub const MAX_PLAYERS: u8 = 8;

/// Share of the map (water) or of the remaining grassland (biomes) each
/// terrain should cover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainRatios {
    /// Water share of the whole map.
    pub water: f64,
    /// Forest share of grassland.
    pub forest: f64,
    /// Hill share of grassland left after forests.
    pub hill: f64,
    /// Mountain share of grassland left after hills.
    pub mountain: f64,
    /// Plains share of grassland left after mountains.
    pub plains: f64,
}

impl Default for TerrainRatios {
    fn default() -> Self {
        Self {
            water: 0.225,
            forest: 0.18,
            hill: 0.12,
            mountain: 0.05,
            plains: 0.14,
        }
    }
}

impl TerrainRatios {
    /// Copy with every ratio clamped to `[0, 1]`. `NaN` becomes 0.
    #[must_use]
    pub fn clamped(&self) -> Self {
        let clamp = |ratio: f64| if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        Self {
            water: clamp(self.water),
            forest: clamp(self.forest),
            hill: clamp(self.hill),
            mountain: clamp(self.mountain),
            plains: clamp(self.plains),
        }
    }
}

/// Map generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Width in tiles.
    pub width: u16,
    /// Height in tiles.
    pub height: u16,
    /// Terrain mix.
    pub ratios: TerrainRatios,
    /// Cellular automaton passes over the water grid.
    pub smoothing_passes: u32,
    /// Fixed seed; `None` draws a fresh one per map.
    pub seed: Option<u64>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            ratios: TerrainRatios::default(),
            smoothing_passes: 5,
            seed: None,
        }
    }
}

/// City placement and growth rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityRules {
    /// Chebyshev radius around the center a city may work.
    pub work_radius: u16,
    /// No other city may be founded within this Chebyshev distance.
    pub min_spacing: u16,
}

impl Default for CityRules {
    fn default() -> Self {
        Self {
            work_radius: 1,
            min_spacing: 2,
        }
    }
}

/// Complete configuration for a new game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Map generation.
    pub map: MapConfig,
    /// Stats for every unit kind.
    pub units: UnitCatalog,
    /// City rules.
    pub cities: CityRules,
    /// Number of players, ids `1..=players`.
    pub players: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            units: UnitCatalog::default(),
            cities: CityRules::default(),
            players: 2,
        }
    }
}

impl GameConfig {
    /// Parse and validate a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`GameConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for zero map dimensions, a player
    /// count outside `1..=8` or unit kinds without stats.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.width == 0 || self.map.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "map size {}x{} must be non-zero",
                self.map.width, self.map.height
            )));
        }
        if self.players == 0 || self.players > MAX_PLAYERS {
            return Err(ConfigError::Invalid(format!(
                "player count {} outside 1..={MAX_PLAYERS}",
                self.players
            )));
        }
        let missing = self.units.missing_kinds();
        if !missing.is_empty() {
            let names: Vec<_> = missing.iter().map(|kind| kind.name()).collect();
            return Err(ConfigError::Invalid(format!(
                "no stats for unit kinds: {}",
                names.join(", ")
            )));
        }
        Ok(())
    }
}
