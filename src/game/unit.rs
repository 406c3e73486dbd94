//! Unit kinds, capabilities and per-unit state.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConstructionError;
use crate::game::{Coord, PlayerId};

/// Unique identifier for a unit.
pub type UnitId = u32;

/// What a unit kind is allowed to do.
///
/// Rules consult these flags rather than matching on concrete kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// May initiate attacks.
    pub can_attack: bool,
    /// May found cities.
    pub can_found_city: bool,
    /// Changes owner instead of dying when defeated.
    pub can_be_captured: bool,
    /// Attacks only orthogonally adjacent targets.
    pub melee: bool,
}

/// Kind of unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Non-combat unit that founds cities.
    Settler,
    /// Melee combat unit.
    Warrior,
    /// Ranged combat unit.
    Archer,
}

impl UnitKind {
    /// Every unit kind.
    pub const ALL: [UnitKind; 3] = [UnitKind::Settler, UnitKind::Warrior, UnitKind::Archer];

    /// Capability set of this kind.
    #[must_use]
    pub const fn capabilities(self) -> Capabilities {
        match self {
            UnitKind::Settler => Capabilities {
                can_attack: false,
                can_found_city: true,
                can_be_captured: true,
                melee: false,
            },
            UnitKind::Warrior => Capabilities {
                can_attack: true,
                can_found_city: false,
                can_be_captured: false,
                melee: true,
            },
            UnitKind::Archer => Capabilities {
                can_attack: true,
                can_found_city: false,
                can_be_captured: false,
                melee: false,
            },
        }
    }

    /// Lowercase name, matching the serialized form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            UnitKind::Settler => "settler",
            UnitKind::Warrior => "warrior",
            UnitKind::Archer => "archer",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnitKind {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ConstructionError::UnknownUnitKind(s.to_string()))
    }
}

/// Static stats for a unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Movement points granted every round.
    pub move_points: u32,
    /// Maximum hit points.
    pub hp: u32,
    /// Damage dealt per attack.
    pub attack: u32,
    /// Attack reach in orthogonal steps; melee kinds use 1.
    pub range: u32,
}

/// Stat table for every unit kind in a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitCatalog {
    stats: BTreeMap<UnitKind, UnitStats>,
}

impl Default for UnitCatalog {
    fn default() -> Self {
        let mut stats = BTreeMap::new();
        stats.insert(
            UnitKind::Settler,
            UnitStats {
                move_points: 2,
                hp: 100,
                attack: 0,
                range: 0,
            },
        );
        stats.insert(
            UnitKind::Warrior,
            UnitStats {
                move_points: 4,
                hp: 100,
                attack: 25,
                range: 1,
            },
        );
        stats.insert(
            UnitKind::Archer,
            UnitStats {
                move_points: 2,
                hp: 80,
                attack: 15,
                range: 2,
            },
        );
        Self { stats }
    }
}

impl UnitCatalog {
    /// Create a catalog with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            stats: BTreeMap::new(),
        }
    }

    /// Set the stats for a kind.
    pub fn insert(&mut self, kind: UnitKind, stats: UnitStats) {
        self.stats.insert(kind, stats);
    }

    /// Stats for a kind.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::MissingStats`] if the kind has no entry.
    pub fn stats(&self, kind: UnitKind) -> Result<UnitStats, ConstructionError> {
        self.stats
            .get(&kind)
            .copied()
            .ok_or(ConstructionError::MissingStats(kind))
    }

    /// Kinds lacking an entry.
    #[must_use]
    pub fn missing_kinds(&self) -> Vec<UnitKind> {
        UnitKind::ALL
            .into_iter()
            .filter(|kind| !self.stats.contains_key(kind))
            .collect()
    }
}

/// A unit on the board.
#[allow(missing_copy_implementations)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Owning player.
    pub owner: PlayerId,
    /// Unit kind.
    pub kind: UnitKind,
    /// Current tile.
    pub position: Coord,
    /// Movement points left this round.
    pub moves: u32,
    /// Current hit points.
    pub hp: u32,
    /// Whether the unit attacked this round.
    pub attacked: bool,
    /// UI selection hint; carries no rules meaning.
    pub selected: bool,
    /// Stats the unit was built with.
    pub stats: UnitStats,
}

impl Unit {
    /// Build a unit with full movement points and hit points.
    ///
    /// # Errors
    ///
    /// Fails if the catalog has no stats for `kind`.
    pub fn new(
        id: UnitId,
        owner: PlayerId,
        kind: UnitKind,
        position: Coord,
        catalog: &UnitCatalog,
    ) -> Result<Self, ConstructionError> {
        let stats = catalog.stats(kind)?;
        Ok(Self {
            id,
            owner,
            kind,
            position,
            moves: stats.move_points,
            hp: stats.hp,
            attacked: false,
            selected: false,
            stats,
        })
    }

    /// Build a unit from a kind name such as `"warrior"`.
    ///
    /// # Errors
    ///
    /// Fails fast on unknown kind names or missing stats.
    pub fn from_kind_name(
        id: UnitId,
        owner: PlayerId,
        kind: &str,
        position: Coord,
        catalog: &UnitCatalog,
    ) -> Result<Self, ConstructionError> {
        let kind = kind.parse::<UnitKind>()?;
        Self::new(id, owner, kind, position, catalog)
    }

    /// Capability set of this unit's kind.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    /// Check whether this unit can attack a target at `target`.
    #[must_use]
    pub fn in_range(&self, target: Coord) -> bool {
        if self.capabilities().melee {
            self.position.is_orthogonally_adjacent(target)
        } else {
            let distance = self.position.manhattan(target);
            distance >= 1 && distance <= self.stats.range
        }
    }

    /// Spend movement points.
    ///
    /// Returns `false` and leaves the budget untouched if it is too small.
    pub fn spend_moves(&mut self, cost: u32) -> bool {
        match self.moves.checked_sub(cost) {
            Some(left) => {
                self.moves = left;
                true
            }
            None => false,
        }
    }

    /// Check if this unit can take one orthogonal step to `to`.
    ///
    /// `passable` answers terrain passability for the destination.
    #[must_use]
    pub fn can_step(&self, to: Coord, passable: bool) -> bool {
        self.moves >= 1 && self.position.is_orthogonally_adjacent(to) && passable
    }

    /// Restore the per-round budget.
    pub fn reset_round(&mut self) {
        self.moves = self.stats.move_points;
        self.attacked = false;
    }

    /// Restore full hit points.
    pub fn heal(&mut self) {
        self.hp = self.stats.hp;
    }
}
