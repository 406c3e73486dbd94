//! Cities and the contiguity-constrained tile claim engine.
//!
//! A city works its founding tile plus up to `population - 1` further tiles
//! inside its work radius. Every worked tile touches another worked tile of
//! the same city (8-directional), and no tile is worked by two cities.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::{Coord, Map, PlayerId, Yield};

/// Unique identifier for a city.
pub type CityId = u32;

/// A city on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// Unique identifier.
    pub id: CityId,
    /// Owning player.
    pub owner: PlayerId,
    /// Founding tile; never changes.
    pub position: Coord,
    /// Population, at least 1.
    pub population: u32,
    /// Display name.
    pub name: String,
    /// Worked tiles in claim order; the center comes first.
    pub worked: Vec<Coord>,
    /// UI selection hint.
    #[serde(default)]
    pub selected: bool,
}

impl City {
    /// Create a city of population 1 that works nothing yet.
    ///
    /// Unnamed cities are called `City {id}`.
    #[must_use]
    pub fn new(id: CityId, owner: PlayerId, position: Coord, name: Option<String>) -> Self {
        Self {
            id,
            owner,
            position,
            population: 1,
            name: name.unwrap_or_else(|| format!("City {id}")),
            worked: Vec::new(),
            selected: false,
        }
    }

    /// Set the population, clamped to at least 1. Claims are not touched.
    pub fn set_population(&mut self, population: u32) {
        self.population = population.max(1);
    }

    /// Whether this city works `coord`.
    #[must_use]
    pub fn is_working(&self, coord: Coord) -> bool {
        self.worked.contains(&coord)
    }

    /// Claim the founding tile unconditionally.
    pub fn claim_center(&mut self, map: &mut Map) {
        if map.force_claim(self.position, self.id, self.owner) && !self.is_working(self.position) {
            self.worked.insert(0, self.position);
        }
    }

    /// Claim tiles until the worked count reaches the population or no
    /// candidate is left.
    pub fn expand(&mut self, map: &mut Map, radius: u16) {
        while self.worked.len() < self.population as usize {
            let Some(next) = self.best_candidate(map, radius) else {
                debug!(
                    city = self.id,
                    population = self.population,
                    worked = self.worked.len(),
                    "no tile left to claim"
                );
                break;
            };
            if map.claim(next, self.id, self.owner).is_err() {
                break;
            }
            self.worked.push(next);
        }
    }

    /// Release the most recently claimed tiles until the worked count
    /// matches the population. The center stays worked.
    pub fn contract(&mut self, map: &mut Map) {
        while self.worked.len() > self.population as usize && self.worked.len() > 1 {
            let Some(coord) = self.worked.pop() else {
                break;
            };
            self.release_tile(map, coord);
        }
    }

    /// Bring worked tiles in line with the population.
    pub fn update(&mut self, map: &mut Map, radius: u16) {
        self.expand(map, radius);
        self.contract(map);
    }

    /// Release every worked tile, center included.
    pub fn release_all(&mut self, map: &mut Map) {
        for coord in std::mem::take(&mut self.worked) {
            self.release_tile(map, coord);
        }
    }

    /// Drop this city's claim on `coord`. A tile the city no longer holds
    /// is left alone.
    fn release_tile(&self, map: &mut Map, coord: Coord) {
        if let Err(err) = map.release(coord, self.id) {
            debug!(city = self.id, %coord, %err, "worked tile was not held");
        }
    }

    /// Summed yield of all worked tiles.
    #[must_use]
    pub fn total_yield(&self, map: &Map) -> Yield {
        let mut total = Yield::default();
        for &coord in &self.worked {
            if let Some(tile_yield) = map.tile_yield(coord) {
                total += tile_yield;
            }
        }
        total
    }

    /// Closest claimable tile by Manhattan distance to the center, scanning
    /// rows top to bottom and columns left to right; the first tile found wins ties.
    fn best_candidate(&self, map: &Map, radius: u16) -> Option<Coord> {
        let radius = i32::from(radius);
        let mut best: Option<(u32, Coord)> = None;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let Some(coord) = self.position.offset(dx, dy, map.width(), map.height()) else {
                    continue;
                };
                if !self.is_candidate(map, coord) {
                    continue;
                }
                let distance = coord.manhattan(self.position);
                if best.is_none_or(|(best_distance, _)| distance < best_distance) {
                    best = Some((distance, coord));
                }
            }
        }

        best.map(|(_, coord)| coord)
    }

    fn is_candidate(&self, map: &Map, coord: Coord) -> bool {
        let Some(tile) = map.get(coord) else {
            return false;
        };
        !self.is_working(coord)
            && tile.terrain.is_claimable()
            && tile.claim.is_none()
            && self.worked.iter().any(|worked| worked.is_moore_adjacent(coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Terrain;

    fn founded(map: &mut Map, id: CityId, position: Coord) -> City {
        let mut city = City::new(id, 1, position, None);
        city.claim_center(map);
        city
    }

    fn assert_contiguous(city: &City) {
        for &coord in &city.worked {
            assert!(
                coord == city.position
                    || city.worked.iter().any(|other| other.is_moore_adjacent(coord)),
                "{coord} is detached from {}",
                city.name
            );
        }
    }

    #[test]
    fn test_city_defaults() {
        let city = City::new(4, 2, Coord::new(3, 3), None);
        assert_eq!(city.population, 1);
        assert_eq!(city.name, "City 4");
        assert!(city.worked.is_empty());
    }

    #[test]
    fn test_claim_center() {
        let mut map = Map::new(10, 10).unwrap();
        let city = founded(&mut map, 1, Coord::new(5, 5));
        assert_eq!(city.worked, vec![Coord::new(5, 5)]);
        assert_eq!(map.claim_of(Coord::new(5, 5)).unwrap().city, 1);
    }

    #[test]
    fn test_expand_prefers_orthogonal_in_scan_order() {
        let mut map = Map::new(10, 10).unwrap();
        let mut city = founded(&mut map, 1, Coord::new(5, 5));

        city.set_population(5);
        city.update(&mut map, 1);

        assert_eq!(
            city.worked,
            vec![
                Coord::new(5, 5),
                Coord::new(5, 4),
                Coord::new(4, 5),
                Coord::new(6, 5),
                Coord::new(5, 6),
            ]
        );

        city.set_population(6);
        city.update(&mut map, 1);
        assert_eq!(city.worked.last(), Some(&Coord::new(4, 4)));
    }

    #[test]
    fn test_expand_stops_when_starved() {
        let mut map = Map::filled(5, 5, Terrain::Water).unwrap();
        map.set_terrain(Coord::new(2, 2), Terrain::Grassland);
        map.set_terrain(Coord::new(3, 2), Terrain::Hill);
        let mut city = founded(&mut map, 1, Coord::new(2, 2));

        city.set_population(4);
        city.update(&mut map, 1);

        assert_eq!(city.worked, vec![Coord::new(2, 2), Coord::new(3, 2)]);
        assert_eq!(city.population, 4);
    }

    #[test]
    fn test_expand_skips_mountains() {
        let mut map = Map::new(5, 5).unwrap();
        map.set_terrain(Coord::new(2, 1), Terrain::Mountain);
        let mut city = founded(&mut map, 1, Coord::new(2, 2));

        city.set_population(2);
        city.update(&mut map, 1);

        assert_eq!(city.worked, vec![Coord::new(2, 2), Coord::new(1, 2)]);
    }

    #[test]
    fn test_contract_releases_latest_first() {
        let mut map = Map::new(10, 10).unwrap();
        let mut city = founded(&mut map, 1, Coord::new(5, 5));
        city.set_population(4);
        city.update(&mut map, 1);
        let latest = *city.worked.last().unwrap();

        city.set_population(3);
        city.update(&mut map, 1);

        assert_eq!(city.worked.len(), 3);
        assert!(!city.is_working(latest));
        assert!(map.claim_of(latest).is_none());
    }

    #[test]
    fn test_set_population_clamps_to_one() {
        let mut map = Map::new(10, 10).unwrap();
        let mut city = founded(&mut map, 1, Coord::new(5, 5));
        city.set_population(0);
        city.update(&mut map, 1);
        assert_eq!(city.population, 1);
        assert_eq!(city.worked, vec![Coord::new(5, 5)]);
    }

    #[test]
    fn test_neighbouring_cities_never_share_tiles() {
        let mut map = Map::new(12, 12).unwrap();
        let mut west = founded(&mut map, 1, Coord::new(4, 5));
        let mut east = founded(&mut map, 2, Coord::new(6, 5));

        for population in 1..=9 {
            west.set_population(population);
            west.update(&mut map, 1);
            east.set_population(population);
            east.update(&mut map, 1);

            for coord in &west.worked {
                assert!(!east.is_working(*coord), "{coord} worked twice");
            }
            assert_contiguous(&west);
            assert_contiguous(&east);
        }
    }

    #[test]
    fn test_release_all() {
        let mut map = Map::new(10, 10).unwrap();
        let mut city = founded(&mut map, 1, Coord::new(5, 5));
        city.set_population(3);
        city.update(&mut map, 1);

        city.release_all(&mut map);

        assert!(city.worked.is_empty());
        assert_eq!(map.tiles_claimed_by(1).count(), 0);
    }

    #[test]
    fn test_release_leaves_foreign_claims() {
        let mut map = Map::new(10, 10).unwrap();
        let mut city = founded(&mut map, 1, Coord::new(5, 5));
        city.set_population(3);
        city.update(&mut map, 1);
        let taken = city.worked[2];
        assert!(map.force_claim(taken, 2, 2));

        city.set_population(2);
        city.update(&mut map, 1);
        assert_eq!(map.claim_of(taken).unwrap().city, 2);

        city.release_all(&mut map);
        assert_eq!(map.claim_of(taken).unwrap().city, 2);
        assert!(map.claim_of(Coord::new(5, 5)).is_none());
    }

    #[test]
    fn test_total_yield() {
        let mut map = Map::new(10, 10).unwrap();
        map.set_terrain(Coord::new(5, 4), Terrain::Forest);
        let mut city = founded(&mut map, 1, Coord::new(5, 5));
        city.set_population(2);
        city.update(&mut map, 1);

        assert_eq!(city.total_yield(&map), Yield::new(3, 3));
    }
}
