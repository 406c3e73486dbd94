//! Error types for the rules engine.
//!
//! Rejected player actions are ordinary values: their `Display` output is the
//! status line shown to the player and the game state is left untouched.
//! Only construction and configuration errors indicate caller bugs.

use thiserror::Error;

use crate::game::{CityId, Coord, PlayerId, UnitId, UnitKind};

/// Reason a player command was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// No unit with this id is in play.
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),
    /// No city with this id exists.
    #[error("unknown city {0}")]
    UnknownCity(CityId),
    /// No player with this id is registered.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    /// The acting unit does not belong to the player whose turn it is.
    #[error("not your turn: player {current} is acting")]
    NotYourTurn {
        /// Player that owns the unit.
        owner: PlayerId,
        /// Player whose turn it is.
        current: PlayerId,
    },
    /// The destination or founding tile cannot be used.
    #[error("invalid move: tile {0} not allowed")]
    TileNotAllowed(Coord),
    /// No path leads to the requested tile.
    #[error("invalid move: no path found")]
    NoPath,
    /// The unit lacks the movement points for the action.
    #[error("invalid move: not enough movement points (need {needed}, have {available})")]
    InsufficientMoves {
        /// Points the action costs.
        needed: u32,
        /// Points the unit has left.
        available: u32,
    },
    /// A city already stands on the tile.
    #[error("a city already exists at {0}")]
    CityAlreadyPresent(Coord),
    /// Another city works the founding tile.
    #[error("tile {coord} is worked by city {city}")]
    TileWorked {
        /// Requested founding tile.
        coord: Coord,
        /// City working it.
        city: CityId,
    },
    /// Another city is inside the minimum spacing.
    #[error("too close to {name} at {position}")]
    TooCloseToCity {
        /// Name of the blocking city.
        name: String,
        /// Position of the blocking city.
        position: Coord,
    },
    /// The unit kind cannot found cities.
    #[error("{0} units cannot found cities")]
    CannotFoundCity(UnitKind),
    /// The unit kind cannot attack.
    #[error("{0} units cannot attack")]
    CannotAttack(UnitKind),
    /// Attacker and target share an owner.
    #[error("cannot attack your own unit")]
    FriendlyTarget,
    /// The attacker already attacked this round.
    #[error("unit {0} already attacked this round")]
    AlreadyAttacked(UnitId),
    /// The target is outside the attacker's range.
    #[error("target at {0} is out of range")]
    OutOfRange(Coord),
    /// No unit stands on the targeted tile.
    #[error("no unit at {0}")]
    NoTarget(Coord),
}

/// Failure of a tile claim or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// The coordinate lies outside the map.
    #[error("tile {0} is outside the map")]
    OutOfBounds(Coord),
    /// Water and mountain tiles cannot be worked.
    #[error("tile {0} cannot be worked")]
    Unclaimable(Coord),
    /// Another city already works the tile.
    #[error("tile {coord} already claimed by city {by}")]
    AlreadyClaimed {
        /// Contested tile.
        coord: Coord,
        /// City holding the claim.
        by: CityId,
    },
    /// The releasing city does not hold the claim.
    #[error("tile {coord} is not claimed by city {city}")]
    NotClaimedBy {
        /// Tile being released.
        coord: Coord,
        /// City that attempted the release.
        city: CityId,
    },
}

/// Failure to construct a unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// The requested kind name is not known.
    #[error("unknown unit kind: {0}")]
    UnknownUnitKind(String),
    /// The unit catalog has no stats for the kind.
    #[error("no stats configured for unit kind {0}")]
    MissingStats(UnitKind),
    /// The spawn position is outside the map.
    #[error("spawn position {0} is outside the map")]
    OutOfBounds(Coord),
    /// The spawn position is water or mountain.
    #[error("spawn position {0} is not passable")]
    Impassable(Coord),
    /// Another unit already stands on the spawn position.
    #[error("spawn position {0} is occupied")]
    Occupied(Coord),
    /// The owning player is not registered.
    #[error("unknown owner {0}")]
    UnknownOwner(PlayerId),
}

/// Failure to load or validate a game configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration is not valid JSON for [`crate::GameConfig`].
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    /// A value is out of its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure to save, load or restore a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// File I/O failed.
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Encoding or decoding failed.
    #[error("snapshot encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    /// The snapshot decoded but describes an impossible game.
    #[error("invalid snapshot: {0}")]
    Invalid(String),
}
