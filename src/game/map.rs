//! Map store: coordinates, terrain, tiles and the tile grid.

use std::fmt;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::error::ClaimError;
use crate::game::{CityId, PlayerId, UnitId};

/// Orthogonal step offsets in the fixed enumeration order: west, east, north, south.
///
/// Path tie-breaking depends on this order.
const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A coordinate on the map.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Offset this coordinate, returning `None` if the result is negative or
    /// does not fit the map bounds.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32, width: u16, height: u16) -> Option<Coord> {
        let x = i32::from(self.x) + dx;
        let y = i32::from(self.y) + dy;
        if x < 0 || y < 0 || x >= i32::from(width) || y >= i32::from(height) {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(Coord::new(x as u16, y as u16))
    }

    /// Get orthogonally adjacent coordinates in west, east, north, south order.
    ///
    /// Returns a fixed-size array and count to avoid heap allocation.
    /// The array contains valid coordinates in indices 0..count.
    #[must_use]
    #[inline]
    pub fn adjacent(&self, width: u16, height: u16) -> ([Coord; 4], u8) {
        let mut result = [Coord::new(0, 0); 4];
        let mut count = 0u8;

        for (dx, dy) in ORTHOGONAL {
            if let Some(next) = self.offset(dx, dy, width, height) {
                result[count as usize] = next;
                count += 1;
            }
        }

        (result, count)
    }

    /// Chebyshev (king-move) distance.
    #[must_use]
    pub fn chebyshev(self, other: Coord) -> u16 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Manhattan (taxicab) distance.
    #[must_use]
    pub fn manhattan(self, other: Coord) -> u32 {
        u32::from(self.x.abs_diff(other.x)) + u32::from(self.y.abs_diff(other.y))
    }

    /// Whether `other` is exactly one orthogonal step away.
    #[must_use]
    pub fn is_orthogonally_adjacent(self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }

    /// Whether `other` is one of the eight surrounding tiles.
    #[must_use]
    pub fn is_moore_adjacent(self, other: Coord) -> bool {
        self != other && self.chebyshev(other) == 1
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Food and production produced by a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Yield {
    /// Food per round.
    pub food: u32,
    /// Production per round.
    pub production: u32,
}

impl Yield {
    /// Create a yield pair.
    #[must_use]
    pub const fn new(food: u32, production: u32) -> Self {
        Self { food, production }
    }
}

impl AddAssign for Yield {
    fn add_assign(&mut self, rhs: Self) {
        self.food += rhs.food;
        self.production += rhs.production;
    }
}

/// Type of terrain on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Terrain {
    /// Default land.
    Grassland = 0,
    /// Open land, production leaning.
    Plains = 1,
    /// Wooded land.
    Forest = 2,
    /// Rough land.
    Hill = 3,
    /// Impassable peaks.
    Mountain = 4,
    /// Impassable water.
    Water = 5,
}

impl Terrain {
    /// Every terrain kind in declaration order.
    pub const ALL: [Terrain; 6] = [
        Terrain::Grassland,
        Terrain::Plains,
        Terrain::Forest,
        Terrain::Hill,
        Terrain::Mountain,
        Terrain::Water,
    ];

    /// Check if units can enter this terrain.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Terrain::Water | Terrain::Mountain)
    }

    /// Check if a city may work this terrain.
    #[must_use]
    pub const fn is_claimable(self) -> bool {
        self.is_passable()
    }

    /// Fixed food/production yield of this terrain.
    #[must_use]
    pub const fn yields(self) -> Yield {
        match self {
            Terrain::Grassland => Yield::new(2, 1),
            Terrain::Plains | Terrain::Forest | Terrain::Hill => Yield::new(1, 2),
            Terrain::Mountain => Yield::new(0, 0),
            Terrain::Water => Yield::new(1, 0),
        }
    }

    /// Lowercase name, matching the serialized form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Terrain::Grassland => "grassland",
            Terrain::Plains => "plains",
            Terrain::Forest => "forest",
            Terrain::Hill => "hill",
            Terrain::Mountain => "mountain",
            Terrain::Water => "water",
        }
    }

    /// Single-character glyph for text dumps.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Terrain::Grassland => '.',
            Terrain::Plains => ',',
            Terrain::Forest => 'f',
            Terrain::Hill => 'h',
            Terrain::Mountain => '^',
            Terrain::Water => '~',
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A city's hold on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// City working the tile.
    pub city: CityId,
    /// Owner of that city.
    pub player: PlayerId,
}

/// A single tile on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Type of terrain.
    pub terrain: Terrain,
    /// City working this tile, if any.
    pub claim: Option<Claim>,
    /// Unit standing on this tile, if any.
    pub occupant: Option<UnitId>,
}

impl Tile {
    /// Create an unclaimed, unoccupied tile.
    #[must_use]
    pub const fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            claim: None,
            occupant: None,
        }
    }

    /// Yield of the tile's terrain.
    #[must_use]
    pub const fn yields(&self) -> Yield {
        self.terrain.yields()
    }
}

/// The game map.
#[derive(Debug, Clone)]
pub struct Map {
    /// Width of the map in tiles.
    width: u16,
    /// Height of the map in tiles.
    height: u16,
    /// Tiles stored in row-major order.
    tiles: Vec<Tile>,
}

impl Map {
    /// Create a new map filled with grassland tiles.
    ///
    /// Returns `None` if width or height is zero.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Option<Self> {
        Self::filled(width, height, Terrain::Grassland)
    }

    /// Create a new map filled with one terrain.
    ///
    /// Returns `None` if width or height is zero.
    #[must_use]
    pub fn filled(width: u16, height: u16, terrain: Terrain) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let size = usize::from(width) * usize::from(height);
        Some(Self {
            width,
            height,
            tiles: vec![Tile::new(terrain); size],
        })
    }

    /// Build a map from row-major terrain.
    ///
    /// Returns `None` if a dimension is zero or the terrain count does not match.
    #[must_use]
    pub fn from_terrain(width: u16, height: u16, terrain: &[Terrain]) -> Option<Self> {
        if width == 0 || height == 0 || terrain.len() != usize::from(width) * usize::from(height) {
            return None;
        }
        Some(Self {
            width,
            height,
            tiles: terrain.iter().map(|&t| Tile::new(t)).collect(),
        })
    }

    /// Get the width of the map.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the height of the map.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Total number of tiles.
    #[must_use]
    pub fn area(&self) -> usize {
        self.tiles.len()
    }

    /// Get a reference to the raw tiles slice in row-major order.
    #[must_use]
    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Check if a coordinate is within the map bounds.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Convert a coordinate to an index into the tiles array.
    #[must_use]
    fn coord_to_index(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
        } else {
            None
        }
    }

    /// Get a reference to the tile at the given coordinate.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        self.coord_to_index(coord).map(|idx| &self.tiles[idx])
    }

    /// Get a mutable reference to the tile at the given coordinate.
    #[must_use]
    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        self.coord_to_index(coord).map(|idx| &mut self.tiles[idx])
    }

    /// Look up a tile from signed coordinates, as raw input positions may be negative.
    #[must_use]
    pub fn lookup(&self, x: i32, y: i32) -> Option<&Tile> {
        let x = u16::try_from(x).ok()?;
        let y = u16::try_from(y).ok()?;
        self.get(Coord::new(x, y))
    }

    /// Terrain at a coordinate.
    #[must_use]
    pub fn terrain(&self, coord: Coord) -> Option<Terrain> {
        self.get(coord).map(|tile| tile.terrain)
    }

    /// Replace the terrain at a coordinate.
    ///
    /// Returns `false` if the coordinate is out of bounds.
    pub fn set_terrain(&mut self, coord: Coord, terrain: Terrain) -> bool {
        if let Some(tile) = self.get_mut(coord) {
            tile.terrain = terrain;
            true
        } else {
            false
        }
    }

    /// In-bounds orthogonal neighbors in west, east, north, south order.
    #[must_use]
    pub fn neighbors(&self, coord: Coord) -> Vec<Coord> {
        if !self.in_bounds(coord) {
            return Vec::new();
        }
        let (adjacent, count) = coord.adjacent(self.width, self.height);
        adjacent[..count as usize].to_vec()
    }

    /// In-bounds Moore (8-direction) neighbors in row-major order.
    pub fn moore_neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .filter_map(move |(dx, dy)| coord.offset(dx, dy, self.width, self.height))
    }

    /// Whether units may enter the tile. Off-map tiles are never passable.
    ///
    /// Occupancy is not considered here.
    #[must_use]
    pub fn is_passable(&self, coord: Coord) -> bool {
        self.get(coord).is_some_and(|tile| tile.terrain.is_passable())
    }

    /// Yield of the tile at a coordinate.
    #[must_use]
    pub fn tile_yield(&self, coord: Coord) -> Option<Yield> {
        self.get(coord).map(Tile::yields)
    }

    /// City working the tile, if any.
    #[must_use]
    pub fn claim_of(&self, coord: Coord) -> Option<Claim> {
        self.get(coord).and_then(|tile| tile.claim)
    }

    /// Claim a tile for a city.
    ///
    /// Re-claiming a tile the city already holds succeeds without change.
    ///
    /// # Errors
    ///
    /// Fails if the tile is off-map, cannot be worked, or another city holds it.
    pub fn claim(&mut self, coord: Coord, city: CityId, player: PlayerId) -> Result<(), ClaimError> {
        let tile = self.get_mut(coord).ok_or(ClaimError::OutOfBounds(coord))?;
        match tile.claim {
            Some(existing) if existing.city == city => Ok(()),
            Some(existing) => Err(ClaimError::AlreadyClaimed {
                coord,
                by: existing.city,
            }),
            None if !tile.terrain.is_claimable() => Err(ClaimError::Unclaimable(coord)),
            None => {
                tile.claim = Some(Claim { city, player });
                Ok(())
            }
        }
    }

    /// Release a tile held by `city`.
    ///
    /// # Errors
    ///
    /// Fails if the tile is off-map or not claimed by `city`.
    pub fn release(&mut self, coord: Coord, city: CityId) -> Result<(), ClaimError> {
        let tile = self.get_mut(coord).ok_or(ClaimError::OutOfBounds(coord))?;
        match tile.claim {
            Some(existing) if existing.city == city => {
                tile.claim = None;
                Ok(())
            }
            _ => Err(ClaimError::NotClaimedBy { coord, city }),
        }
    }

    /// Force a claim regardless of terrain or prior holder.
    ///
    /// Used for city centers, which are always worked.
    pub(crate) fn force_claim(&mut self, coord: Coord, city: CityId, player: PlayerId) -> bool {
        if let Some(tile) = self.get_mut(coord) {
            tile.claim = Some(Claim { city, player });
            true
        } else {
            false
        }
    }

    /// Unit standing on a tile.
    #[must_use]
    pub fn occupant(&self, coord: Coord) -> Option<UnitId> {
        self.get(coord).and_then(|tile| tile.occupant)
    }

    /// Record a unit as standing on a tile.
    ///
    /// Returns `false` if the coordinate is out of bounds.
    pub fn set_occupant(&mut self, coord: Coord, unit: UnitId) -> bool {
        if let Some(tile) = self.get_mut(coord) {
            tile.occupant = Some(unit);
            true
        } else {
            false
        }
    }

    /// Clear a tile's occupant if it is `unit`.
    pub fn clear_occupant(&mut self, coord: Coord, unit: UnitId) {
        if let Some(tile) = self.get_mut(coord) {
            if tile.occupant == Some(unit) {
                tile.occupant = None;
            }
        }
    }

    /// Iterate over all coordinates and tiles in row-major order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Tile)> {
        self.tiles.iter().enumerate().map(|(idx, tile)| {
            let x = (idx % usize::from(self.width)) as u16;
            let y = (idx / usize::from(self.width)) as u16;
            (Coord::new(x, y), tile)
        })
    }

    /// Count tiles of a terrain kind.
    #[must_use]
    pub fn count_terrain(&self, terrain: Terrain) -> usize {
        self.tiles.iter().filter(|tile| tile.terrain == terrain).count()
    }

    /// Tiles claimed by a city.
    pub fn tiles_claimed_by(&self, city: CityId) -> impl Iterator<Item = (Coord, &Tile)> {
        self.iter()
            .filter(move |(_, tile)| tile.claim.is_some_and(|claim| claim.city == city))
    }
}
