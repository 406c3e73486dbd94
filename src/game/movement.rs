//! Breadth-first reachability and city site validation.

use std::collections::{HashMap, VecDeque};

use crate::error::ActionError;
use crate::game::{City, Coord, Map, Unit};

/// Tiles a unit can stop on this round, with the shortest path to each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reachability {
    /// Reachable tiles in discovery order. Never contains the start tile.
    pub tiles: Vec<Coord>,
    /// Full path, start tile first, for every reachable tile.
    pub paths: HashMap<Coord, Vec<Coord>>,
}

impl Reachability {
    /// Whether `coord` is reachable.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        self.paths.contains_key(&coord)
    }

    /// Path from the start to `coord`, both ends included.
    #[must_use]
    pub fn path(&self, coord: Coord) -> Option<&[Coord]> {
        self.paths.get(&coord).map(Vec::as_slice)
    }

    /// Movement points needed to reach `coord`.
    #[must_use]
    pub fn cost(&self, coord: Coord) -> Option<u32> {
        self.paths
            .get(&coord)
            .map(|path| u32::try_from(path.len().saturating_sub(1)).unwrap_or(u32::MAX))
    }

    /// Number of reachable tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no tile is reachable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Compute every tile `unit` can reach with its remaining movement points.
///
/// Steps are orthogonal and explored west, east, north, south. Water and
/// mountains block movement. Tiles held by other units may be walked
/// through but are not destinations.
#[must_use]
pub fn compute_reachable(map: &Map, unit: &Unit) -> Reachability {
    let start = unit.position;
    let mut reach = Reachability::default();
    if !map.in_bounds(start) {
        return reach;
    }

    let mut distance: HashMap<Coord, u32> = HashMap::new();
    let mut parent: HashMap<Coord, Coord> = HashMap::new();
    let mut queue = VecDeque::new();
    distance.insert(start, 0);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let steps = distance[&current];
        if steps >= unit.moves {
            continue;
        }
        for next in map.neighbors(current) {
            if distance.contains_key(&next) || !map.is_passable(next) {
                continue;
            }
            distance.insert(next, steps + 1);
            parent.insert(next, current);
            queue.push_back(next);

            let occupied = map.occupant(next).is_some_and(|id| id != unit.id);
            if !occupied {
                reach.tiles.push(next);
            }
        }
    }

    for &tile in &reach.tiles {
        let mut path = vec![tile];
        let mut cursor = tile;
        while let Some(&previous) = parent.get(&cursor) {
            path.push(previous);
            cursor = previous;
        }
        path.reverse();
        reach.paths.insert(tile, path);
    }

    reach
}

/// Check that a city may be founded at `position`.
///
/// # Errors
///
/// Returns [`ActionError::TileNotAllowed`] for impassable or off-map tiles,
/// [`ActionError::CityAlreadyPresent`] if a city stands there,
/// [`ActionError::TooCloseToCity`] if another city lies within `spacing`
/// tiles (Chebyshev distance) and [`ActionError::TileWorked`] if another
/// city already works the tile.
pub fn can_found_city<'a>(
    map: &Map,
    cities: impl IntoIterator<Item = &'a City>,
    position: Coord,
    spacing: u16,
) -> Result<(), ActionError> {
    if !map.is_passable(position) {
        return Err(ActionError::TileNotAllowed(position));
    }
    for city in cities {
        if city.position == position {
            return Err(ActionError::CityAlreadyPresent(position));
        }
        if city.position.chebyshev(position) <= spacing {
            return Err(ActionError::TooCloseToCity {
                name: city.name.clone(),
                position: city.position,
            });
        }
    }
    if let Some(claim) = map.claim_of(position) {
        return Err(ActionError::TileWorked {
            coord: position,
            city: claim.city,
        });
    }
    Ok(())
}
