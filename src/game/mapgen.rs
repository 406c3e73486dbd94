//! Deterministic terrain generation.
//!
//! Land and water come from a Bernoulli seed grid smoothed by a single
//! threshold cellular automaton, topped up with scattered water if smoothing
//! drained too much of it. Land starts as grassland and is then splatted with
//! clustered biomes: forest, hill, mountain, plains, always in that order.

// Map generation uses intentional casts for ratio arithmetic
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::{MapConfig, TerrainRatios};
use crate::game::{Coord, Map, Terrain};

/// A cell becomes water when more than this many cells of its 3x3 window are water.
const WATER_THRESHOLD: usize = 3;

/// Water is topped up when it falls below this share of the configured target.
const WATER_FLOOR: f64 = 0.8;

/// Attempts spent converting land to water during top-up.
const WATER_TOP_UP_ATTEMPTS: u32 = 500;

/// Largest cluster grown from one biome seed.
const MAX_CLUSTER: u32 = 5;

/// Attempts allowed per tile of biome target.
const BIOME_RETRY_FACTOR: usize = 8;

/// Per-terrain tile counts of a map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerrainCounts {
    counts: [usize; Terrain::ALL.len()],
}

impl TerrainCounts {
    /// Count every terrain on a map.
    #[must_use]
    pub fn of(map: &Map) -> Self {
        let mut counts = [0; Terrain::ALL.len()];
        for tile in map.tiles() {
            counts[tile.terrain as usize] += 1;
        }
        Self { counts }
    }

    /// Tiles of one terrain.
    #[must_use]
    pub const fn get(&self, terrain: Terrain) -> usize {
        self.counts[terrain as usize]
    }

    /// Total tiles counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Share of one terrain in `[0, 1]`.
    #[must_use]
    pub fn share(&self, terrain: Terrain) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.get(terrain) as f64 / total as f64
        }
    }
}

/// Generate a map from configuration, returning it with the seed used.
///
/// Without a configured seed one is drawn from the thread RNG and logged so
/// the map can be reproduced.
///
/// Returns `None` if a dimension is zero.
#[must_use]
pub fn generate_map(config: &MapConfig) -> Option<(Map, u64)> {
    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let map = generate_terrain(
        config.width,
        config.height,
        &config.ratios,
        config.smoothing_passes,
        &mut rng,
    )?;

    let counts = TerrainCounts::of(&map);
    info!(
        seed,
        width = config.width,
        height = config.height,
        water = counts.get(Terrain::Water),
        grassland = counts.get(Terrain::Grassland),
        plains = counts.get(Terrain::Plains),
        forest = counts.get(Terrain::Forest),
        hill = counts.get(Terrain::Hill),
        mountain = counts.get(Terrain::Mountain),
        "generated map"
    );

    Some((map, seed))
}

/// Generate terrain with an injected random source.
///
/// Returns `None` if a dimension is zero.
pub fn generate_terrain<R: Rng + ?Sized>(
    width: u16,
    height: u16,
    ratios: &TerrainRatios,
    smoothing_passes: u32,
    rng: &mut R,
) -> Option<Map> {
    if width == 0 || height == 0 {
        return None;
    }
    let ratios = ratios.clamped();

    let mut water = seed_water(width, height, ratios.water, rng);
    for _ in 0..smoothing_passes {
        water = smooth(&water, width, height);
    }
    top_up_water(&mut water, width, height, ratios.water, rng);

    let terrain: Vec<Terrain> = water
        .iter()
        .map(|&is_water| if is_water { Terrain::Water } else { Terrain::Grassland })
        .collect();
    let mut map = Map::from_terrain(width, height, &terrain)?;

    for (biome, ratio) in [
        (Terrain::Forest, ratios.forest),
        (Terrain::Hill, ratios.hill),
        (Terrain::Mountain, ratios.mountain),
        (Terrain::Plains, ratios.plains),
    ] {
        splat_biome(&mut map, biome, ratio, rng);
    }

    Some(map)
}

/// Independent Bernoulli draw per cell; `true` is water.
fn seed_water<R: Rng + ?Sized>(width: u16, height: u16, ratio: f64, rng: &mut R) -> Vec<bool> {
    let size = usize::from(width) * usize::from(height);
    (0..size).map(|_| rng.random::<f64>() < ratio).collect()
}

/// One cellular automaton pass over the clamped 3x3 window of every cell.
fn smooth(grid: &[bool], width: u16, height: u16) -> Vec<bool> {
    let mut next = vec![false; grid.len()];
    let w = usize::from(width);

    for y in 0..height {
        for x in 0..width {
            let center = Coord::new(x, y);
            let mut water_cells = 0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if let Some(c) = center.offset(dx, dy, width, height) {
                        if grid[usize::from(c.y) * w + usize::from(c.x)] {
                            water_cells += 1;
                        }
                    }
                }
            }
            next[usize::from(y) * w + usize::from(x)] = water_cells > WATER_THRESHOLD;
        }
    }

    next
}

/// Flip random land cells to water until the floor is met or attempts run out.
fn top_up_water<R: Rng + ?Sized>(
    grid: &mut [bool],
    width: u16,
    height: u16,
    ratio: f64,
    rng: &mut R,
) {
    let floor = (ratio * grid.len() as f64 * WATER_FLOOR) as usize;
    let mut total = grid.iter().filter(|&&w| w).count();
    let before = total;
    let w = usize::from(width);

    let mut attempts = 0;
    while total < floor && attempts < WATER_TOP_UP_ATTEMPTS {
        let x = usize::from(rng.random_range(0..width));
        let y = usize::from(rng.random_range(0..height));
        let cell = &mut grid[y * w + x];
        if !*cell {
            *cell = true;
            total += 1;
        }
        attempts += 1;
    }

    debug!(before, after = total, floor, attempts, "water top-up");
}

/// Convert `ratio` of the current grassland into clustered `biome` tiles.
fn splat_biome<R: Rng + ?Sized>(map: &mut Map, biome: Terrain, ratio: f64, rng: &mut R) {
    let grassland = map.count_terrain(Terrain::Grassland);
    let target = (ratio * grassland as f64) as usize;
    let max_tries = target * BIOME_RETRY_FACTOR;
    let (width, height) = (map.width(), map.height());

    let mut remaining = target;
    let mut tries = 0;
    while remaining > 0 && tries < max_tries {
        tries += 1;
        let seed = Coord::new(rng.random_range(0..width), rng.random_range(0..height));
        if map.terrain(seed) != Some(Terrain::Grassland) {
            continue;
        }

        let cluster = rng.random_range(1..=MAX_CLUSTER);
        for _ in 0..cluster {
            let dx = rng.random_range(-1..=1);
            let dy = rng.random_range(-1..=1);
            let Some(coord) = seed.offset(dx, dy, width, height) else {
                continue;
            };
            if map.terrain(coord) == Some(Terrain::Grassland) {
                map.set_terrain(coord, biome);
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
        }
    }

    debug!(%biome, target, placed = target - remaining, tries, "biome splat");
}

/// Find `count` distinct passable tiles that each have a passable neighbor.
///
/// Columns are scanned left to right, each from top to bottom. If the map
/// has too few such tiles, the list is padded with `(i, 0)` where `i` is the
/// slot index.
#[must_use]
pub fn find_starting_tiles(map: &Map, count: usize) -> Vec<Coord> {
    let mut found = Vec::with_capacity(count);
    if count == 0 {
        return found;
    }

    'scan: for x in 0..map.width() {
        for y in 0..map.height() {
            let coord = Coord::new(x, y);
            let open = map.is_passable(coord)
                && map.neighbors(coord).into_iter().any(|n| map.is_passable(n));
            if open && !found.contains(&coord) {
                found.push(coord);
                if found.len() == count {
                    break 'scan;
                }
            }
        }
    }

    while found.len() < count {
        let slot = u16::try_from(found.len()).unwrap_or(u16::MAX);
        found.push(Coord::new(slot, 0));
    }
    found
}

/// First passable tile among `preferred`, else the first passable tile in
/// row-major order, else the origin.
#[must_use]
pub fn find_passable_tile(map: &Map, preferred: &[Coord]) -> Coord {
    preferred
        .iter()
        .copied()
        .find(|&coord| map.is_passable(coord))
        .or_else(|| {
            map.iter()
                .find(|(_, tile)| tile.terrain.is_passable())
                .map(|(coord, _)| coord)
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(width: u16, height: u16, seed: u64) -> MapConfig {
        MapConfig {
            width,
            height,
            seed: Some(seed),
            ..MapConfig::default()
        }
    }

    #[test]
    fn test_map_generation_determinism() {
        let (map1, seed1) = generate_map(&config(32, 32, 42)).unwrap();
        let (map2, seed2) = generate_map(&config(32, 32, 42)).unwrap();

        assert_eq!(seed1, seed2);
        assert_eq!(map1.tiles(), map2.tiles());
    }

    #[test]
    fn test_map_generation_different_seeds() {
        let (map1, _) = generate_map(&config(32, 32, 42)).unwrap();
        let (map2, _) = generate_map(&config(32, 32, 43)).unwrap();

        let differences = map1
            .tiles()
            .iter()
            .zip(map2.tiles())
            .filter(|(a, b)| a.terrain != b.terrain)
            .count();
        assert!(differences > 0);
    }

    #[test]
    fn test_zero_size() {
        assert!(generate_map(&config(0, 10, 1)).is_none());
        assert!(generate_map(&config(10, 0, 1)).is_none());
    }

    #[test]
    fn test_water_floor() {
        for seed in 0..20 {
            let cfg = config(20, 20, seed);
            let (map, _) = generate_map(&cfg).unwrap();
            let water = map.count_terrain(Terrain::Water) as f64;
            let floor = 0.5 * cfg.ratios.water * 400.0;
            assert!(water >= floor, "seed {seed}: {water} water tiles < {floor}");
        }
    }

    #[test]
    fn test_terrain_coverage() {
        for seed in 0..5 {
            let (map, _) = generate_map(&config(30, 30, seed)).unwrap();
            let counts = TerrainCounts::of(&map);
            for terrain in [
                Terrain::Grassland,
                Terrain::Plains,
                Terrain::Forest,
                Terrain::Hill,
                Terrain::Water,
            ] {
                assert!(counts.get(terrain) > 0, "seed {seed}: no {terrain}");
            }
            assert_eq!(counts.total(), 900);
        }
    }

    #[test]
    fn test_no_water_ratio_yields_dry_map() {
        let ratios = TerrainRatios {
            water: 0.0,
            forest: 0.0,
            hill: 0.0,
            mountain: 0.0,
            plains: 0.0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let map = generate_terrain(10, 10, &ratios, 5, &mut rng).unwrap();
        assert_eq!(map.count_terrain(Terrain::Grassland), 100);
    }

    #[test]
    fn test_smoothing_fills_majority_water() {
        let grid = vec![true; 9];
        assert!(smooth(&grid, 3, 3).iter().all(|&w| w));

        let mut sparse = vec![false; 9];
        sparse[4] = true;
        assert!(smooth(&sparse, 3, 3).iter().all(|&w| !w));
    }

    #[test]
    fn test_starting_tiles_are_open_and_distinct() {
        let (map, _) = generate_map(&config(20, 20, 3)).unwrap();
        let tiles = find_starting_tiles(&map, 4);

        assert_eq!(tiles.len(), 4);
        for (i, &tile) in tiles.iter().enumerate() {
            assert!(map.is_passable(tile));
            assert!(map.neighbors(tile).into_iter().any(|n| map.is_passable(n)));
            assert!(!tiles[..i].contains(&tile));
        }
    }

    #[test]
    fn test_starting_tiles_fallback() {
        let mut map = Map::filled(6, 6, Terrain::Water).unwrap();
        map.set_terrain(Coord::new(3, 3), Terrain::Grassland);
        map.set_terrain(Coord::new(3, 4), Terrain::Plains);

        let tiles = find_starting_tiles(&map, 3);

        assert_eq!(
            tiles,
            vec![Coord::new(3, 3), Coord::new(3, 4), Coord::new(2, 0)]
        );
    }

    #[test]
    fn test_find_passable_tile() {
        let mut map = Map::filled(5, 5, Terrain::Water).unwrap();
        assert_eq!(find_passable_tile(&map, &[Coord::new(2, 2)]), Coord::new(0, 0));

        map.set_terrain(Coord::new(4, 1), Terrain::Hill);
        assert_eq!(find_passable_tile(&map, &[Coord::new(2, 2)]), Coord::new(4, 1));

        map.set_terrain(Coord::new(2, 2), Terrain::Forest);
        assert_eq!(
            find_passable_tile(&map, &[Coord::new(9, 9), Coord::new(2, 2)]),
            Coord::new(2, 2)
        );
    }

    #[test]
    fn test_biomes_only_consume_grassland() {
        let ratios = TerrainRatios {
            water: 0.3,
            forest: 1.0,
            hill: 0.0,
            mountain: 0.0,
            plains: 0.0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let map = generate_terrain(16, 16, &ratios, 2, &mut rng).unwrap();

        let mut water_only = ratios;
        water_only.forest = 0.0;
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let base = generate_terrain(16, 16, &water_only, 2, &mut rng).unwrap();

        assert_eq!(
            map.count_terrain(Terrain::Water),
            base.count_terrain(Terrain::Water)
        );
    }
}
