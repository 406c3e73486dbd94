//! Output formatting utilities for CLI.

use frontier::game::TerrainCounts;
use frontier::{Coord, GameState, Terrain, UnitKind};
use serde::Serialize;

/// Render the map as an ASCII grid.
///
/// Output format:
/// ```text
/// ┌─────────────────────┐
/// │ . . , f ~ ~ ~ . . . │
/// │ . S . f ~ ~ . h ^ . │
/// │ . . C . . ~ . . . . │
/// └─────────────────────┘
/// ```
pub(super) fn render_map(state: &GameState) -> String {
    let map = state.map();
    let border = "─".repeat(usize::from(map.width()) * 2 + 1);
    let mut output = String::new();

    output.push_str(&format!("┌{border}┐\n"));
    for y in 0..map.height() {
        output.push_str("│ ");
        for x in 0..map.width() {
            output.push(tile_symbol(state, Coord::new(x, y)));
            output.push(' ');
        }
        output.push_str("│\n");
    }
    output.push_str(&format!("└{border}┘\n"));

    output.push_str("\nLegend: .=Grassland ,=Plains f=Forest h=Hill ^=Mountain ~=Water\n");
    output.push_str("        C=City S=Settler W=Warrior A=Archer\n");
    output
}

fn tile_symbol(state: &GameState, coord: Coord) -> char {
    if let Some(unit) = state.unit_at(coord) {
        return match unit.kind {
            UnitKind::Settler => 'S',
            UnitKind::Warrior => 'W',
            UnitKind::Archer => 'A',
        };
    }
    if state.city_at(coord).is_some() {
        return 'C';
    }
    state.map().terrain(coord).map_or('?', Terrain::glyph)
}

/// Format a game overview as human-readable text.
pub(super) fn format_summary(state: &GameState) -> String {
    let map = state.map();
    let counts = TerrainCounts::of(map);
    let mut output = String::new();

    match state.seed() {
        Some(seed) => {
            output.push_str(&format!("Map {}x{} (seed: {seed})\n", map.width(), map.height()));
        }
        None => {
            output.push_str(&format!("Map {}x{}\n", map.width(), map.height()));
        }
    }
    output.push_str(&format!(
        "  Round: {}  Current player: {}\n",
        state.round(),
        state.current_player()
    ));

    output.push_str("\nTerrain:\n");
    for terrain in Terrain::ALL {
        output.push_str(&format!(
            "  {:<10} {:>5} ({:>5.1}%)\n",
            terrain.name(),
            counts.get(terrain),
            counts.share(terrain) * 100.0
        ));
    }

    output.push_str("\nPlayers:\n");
    for player in state.players() {
        output.push_str(&format!(
            "  Player {}: {} units, {} cities\n",
            player.id,
            player.unit_ids.len(),
            player.city_ids.len()
        ));
    }

    let cities: Vec<_> = state.cities().collect();
    if !cities.is_empty() {
        output.push_str("\nCities:\n");
        for city in cities {
            let total = city.total_yield(map);
            output.push_str(&format!(
                "  {} at {} (player {}): pop {}, {} tiles, food {} production {}\n",
                city.name,
                city.position,
                city.owner,
                city.population,
                city.worked.len(),
                total.food,
                total.production
            ));
        }
    }

    output
}

/// Terrain share statistics across many generated maps.
#[derive(Debug, Clone)]
pub(super) struct TuneStats {
    /// Maps folded in.
    pub(super) maps: u64,
    /// Sum of shares per terrain.
    sums: [f64; Terrain::ALL.len()],
    /// Smallest share seen per terrain.
    mins: [f64; Terrain::ALL.len()],
    /// Largest share seen per terrain.
    maxs: [f64; Terrain::ALL.len()],
}

impl Default for TuneStats {
    fn default() -> Self {
        Self {
            maps: 0,
            sums: [0.0; Terrain::ALL.len()],
            mins: [f64::INFINITY; Terrain::ALL.len()],
            maxs: [0.0; Terrain::ALL.len()],
        }
    }
}

impl TuneStats {
    /// Add one map's counts.
    pub(super) fn add(&mut self, counts: &TerrainCounts) {
        self.maps += 1;
        for (i, terrain) in Terrain::ALL.into_iter().enumerate() {
            let share = counts.share(terrain);
            self.sums[i] += share;
            self.mins[i] = self.mins[i].min(share);
            self.maxs[i] = self.maxs[i].max(share);
        }
    }

    /// Merge stats gathered on another thread.
    pub(super) fn merge(&mut self, other: &Self) {
        self.maps += other.maps;
        for i in 0..Terrain::ALL.len() {
            self.sums[i] += other.sums[i];
            self.mins[i] = self.mins[i].min(other.mins[i]);
            self.maxs[i] = self.maxs[i].max(other.maxs[i]);
        }
    }

    /// Mean, min and max share of one terrain.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn share(&self, terrain: Terrain) -> (f64, f64, f64) {
        if self.maps == 0 {
            return (0.0, 0.0, 0.0);
        }
        let i = terrain as usize;
        (self.sums[i] / self.maps as f64, self.mins[i], self.maxs[i])
    }
}

/// JSON-serializable tuning result.
#[derive(Debug, Serialize)]
pub(super) struct JsonTuneResult {
    /// Maps generated.
    maps: u64,
    /// Seed of the first map.
    base_seed: u64,
    /// Per-terrain shares.
    terrain: Vec<JsonTerrainShare>,
}

/// JSON-serializable share of one terrain.
#[derive(Debug, Serialize)]
pub(super) struct JsonTerrainShare {
    /// Terrain name.
    terrain: &'static str,
    /// Mean share (0.0-1.0).
    mean: f64,
    /// Smallest share.
    min: f64,
    /// Largest share.
    max: f64,
}

impl JsonTuneResult {
    /// Create from aggregated stats.
    pub(super) fn from_stats(stats: &TuneStats, base_seed: u64) -> Self {
        let terrain = Terrain::ALL
            .into_iter()
            .map(|terrain| {
                let (mean, min, max) = stats.share(terrain);
                JsonTerrainShare {
                    terrain: terrain.name(),
                    mean,
                    min,
                    max,
                }
            })
            .collect();
        Self {
            maps: stats.maps,
            base_seed,
            terrain,
        }
    }
}

/// Format tuning stats as human-readable text.
pub(super) fn format_tune_text(stats: &TuneStats, base_seed: u64) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Terrain Shares ({} maps, base seed {base_seed})\n",
        stats.maps
    ));
    output.push_str("========================================\n\n");
    output.push_str(&format!("  {:<10} {:>7} {:>7} {:>7}\n", "terrain", "mean", "min", "max"));
    for terrain in Terrain::ALL {
        let (mean, min, max) = stats.share(terrain);
        output.push_str(&format!(
            "  {:<10} {:>6.1}% {:>6.1}% {:>6.1}%\n",
            terrain.name(),
            mean * 100.0,
            min * 100.0,
            max * 100.0
        ));
    }

    output
}
