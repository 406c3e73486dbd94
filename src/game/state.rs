//! Game state management.
//!
//! [`GameState`] owns the map, units, cities, players and turn order. Every
//! rules-relevant change goes through one of its commands, which validate
//! first and leave the state untouched when they return an error.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::{CityRules, GameConfig};
use crate::error::{ActionError, ConfigError, ConstructionError};
use crate::game::{
    AttackOutcome, City, CityId, Coord, Map, Player, PlayerId, Reachability, Resolution, Tile,
    TurnOutcome, TurnState, Unit, UnitCatalog, UnitId, UnitKind, Yield, can_found_city,
    compute_reachable, find_passable_tile, find_starting_tiles, generate_map, resolve_attack,
    validate_attack,
};

/// Complete game state.
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) map: Map,
    pub(crate) units: BTreeMap<UnitId, Unit>,
    pub(crate) cities: BTreeMap<CityId, City>,
    pub(crate) players: BTreeMap<PlayerId, Player>,
    pub(crate) turns: TurnState,
    pub(crate) catalog: UnitCatalog,
    pub(crate) rules: CityRules,
    pub(crate) next_unit_id: UnitId,
    pub(crate) next_city_id: CityId,
    pub(crate) seed: Option<u64>,
}

impl GameState {
    /// Create a game on an existing map with empty player rosters.
    #[must_use]
    pub fn new(
        map: Map,
        players: impl IntoIterator<Item = PlayerId>,
        catalog: UnitCatalog,
        rules: CityRules,
    ) -> Self {
        let players: BTreeMap<PlayerId, Player> = players
            .into_iter()
            .map(|id| (id, Player::new(id)))
            .collect();
        let turns = TurnState::new(players.keys().copied());
        Self {
            map,
            units: BTreeMap::new(),
            cities: BTreeMap::new(),
            players,
            turns,
            catalog,
            rules,
            next_unit_id: 1,
            next_city_id: 1,
            seed: None,
        }
    }

    /// Generate a map and place one settler per player.
    ///
    /// Players get ids `1..=config.players`. Settlers start near the map
    /// corners when those tiles are passable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration fails validation.
    pub fn new_game(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (map, seed) = generate_map(&config.map)
            .ok_or_else(|| ConfigError::Invalid("map has no tiles".to_string()))?;

        let mut state = Self::new(map, 1..=config.players, config.units.clone(), config.cities);
        state.seed = Some(seed);
        state.place_settlers();

        info!(
            seed,
            players = config.players,
            units = state.units.len(),
            "new game"
        );
        Ok(state)
    }

    fn place_settlers(&mut self) {
        let far_x = self.map.width().saturating_sub(3);
        let far_y = self.map.height().saturating_sub(3);
        let corners = [
            Coord::new(2, 2),
            Coord::new(far_x, far_y),
            Coord::new(far_x, 2),
            Coord::new(2, far_y),
        ];
        let owners: Vec<PlayerId> = self.players.keys().copied().collect();
        let scanned = find_starting_tiles(&self.map, owners.len());

        for (slot, owner) in owners.into_iter().enumerate() {
            let preferred: Vec<Coord> = corners
                .get(slot)
                .into_iter()
                .chain(&scanned)
                .copied()
                .filter(|&coord| self.map.occupant(coord).is_none())
                .collect();
            let position = find_passable_tile(&self.map, &preferred);
            if let Err(err) = self.spawn_unit(owner, UnitKind::Settler, position) {
                warn!(owner, %position, %err, "could not place starting settler");
            }
        }
    }

    // --- queries ---

    /// The map.
    #[must_use]
    pub const fn map(&self) -> &Map {
        &self.map
    }

    /// Tile at a coordinate, `None` off the map.
    #[must_use]
    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        self.map.get(coord)
    }

    /// Yield of the tile at a coordinate.
    #[must_use]
    pub fn tile_yield(&self, coord: Coord) -> Option<Yield> {
        self.map.tile_yield(coord)
    }

    /// All units in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Unit standing on a tile.
    #[must_use]
    pub fn unit_at(&self, coord: Coord) -> Option<&Unit> {
        self.map.occupant(coord).and_then(|id| self.units.get(&id))
    }

    /// All cities in founding order.
    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.cities.values()
    }

    /// City by id.
    #[must_use]
    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(&id)
    }

    /// City founded on a tile.
    #[must_use]
    pub fn city_at(&self, coord: Coord) -> Option<&City> {
        self.cities.values().find(|city| city.position == coord)
    }

    /// Summed yield of a city's worked tiles.
    #[must_use]
    pub fn city_yield(&self, id: CityId) -> Option<Yield> {
        self.cities.get(&id).map(|city| city.total_yield(&self.map))
    }

    /// All players in turn order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Player by id.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Player whose units may act.
    #[must_use]
    pub const fn current_player(&self) -> PlayerId {
        self.turns.current()
    }

    /// Current round, starting at 1.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.turns.round()
    }

    /// Turn bookkeeping.
    #[must_use]
    pub const fn turns(&self) -> &TurnState {
        &self.turns
    }

    /// Tiles a unit can move to this round.
    #[must_use]
    pub fn reachable(&self, unit: UnitId) -> Option<Reachability> {
        self.units
            .get(&unit)
            .map(|unit| compute_reachable(&self.map, unit))
    }

    /// The selected unit, if any.
    #[must_use]
    pub fn selected_unit(&self) -> Option<&Unit> {
        self.units.values().find(|unit| unit.selected)
    }

    /// The selected city, if any.
    #[must_use]
    pub fn selected_city(&self) -> Option<&City> {
        self.cities.values().find(|city| city.selected)
    }

    /// Unit stat table used for spawning.
    #[must_use]
    pub const fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    /// City rules in force.
    #[must_use]
    pub const fn rules(&self) -> CityRules {
        self.rules
    }

    /// Seed the map was generated from, if known.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    // --- commands ---

    /// Create a unit for `owner` at `position`.
    ///
    /// # Errors
    ///
    /// Fails for unknown owners, off-map, impassable or occupied positions
    /// and unit kinds without stats.
    pub fn spawn_unit(
        &mut self,
        owner: PlayerId,
        kind: UnitKind,
        position: Coord,
    ) -> Result<UnitId, ConstructionError> {
        if !self.players.contains_key(&owner) {
            return Err(ConstructionError::UnknownOwner(owner));
        }
        if !self.map.in_bounds(position) {
            return Err(ConstructionError::OutOfBounds(position));
        }
        if !self.map.is_passable(position) {
            return Err(ConstructionError::Impassable(position));
        }
        if self.map.occupant(position).is_some() {
            return Err(ConstructionError::Occupied(position));
        }

        let id = self.next_unit_id;
        let unit = Unit::new(id, owner, kind, position, &self.catalog)?;
        self.next_unit_id += 1;
        self.map.set_occupant(position, id);
        self.units.insert(id, unit);
        if let Some(player) = self.players.get_mut(&owner) {
            player.add_unit(id);
        }

        debug!(unit = id, owner, %kind, %position, "unit spawned");
        Ok(id)
    }

    /// Create a unit from a kind name such as `"archer"`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::UnknownUnitKind`] for unknown names,
    /// otherwise as [`GameState::spawn_unit`].
    pub fn spawn_named(
        &mut self,
        owner: PlayerId,
        kind: &str,
        position: Coord,
    ) -> Result<UnitId, ConstructionError> {
        let kind = kind.parse::<UnitKind>()?;
        self.spawn_unit(owner, kind, position)
    }

    /// Select a unit, clearing any other selection.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::UnknownUnit`] if the unit does not exist.
    pub fn select_unit(&mut self, id: UnitId) -> Result<(), ActionError> {
        if !self.units.contains_key(&id) {
            return Err(ActionError::UnknownUnit(id));
        }
        self.clear_selection();
        if let Some(unit) = self.units.get_mut(&id) {
            unit.selected = true;
        }
        Ok(())
    }

    /// Select a city, clearing any other selection.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::UnknownCity`] if the city does not exist.
    pub fn select_city(&mut self, id: CityId) -> Result<(), ActionError> {
        if !self.cities.contains_key(&id) {
            return Err(ActionError::UnknownCity(id));
        }
        self.clear_selection();
        if let Some(city) = self.cities.get_mut(&id) {
            city.selected = true;
        }
        Ok(())
    }

    /// Deselect every unit and city.
    pub fn clear_selection(&mut self) {
        for unit in self.units.values_mut() {
            unit.selected = false;
        }
        for city in self.cities.values_mut() {
            city.selected = false;
        }
    }

    /// Move a unit along the shortest path to `destination`.
    ///
    /// # Errors
    ///
    /// Rejects units of other players, unusable destinations, unreachable
    /// destinations and destinations beyond the unit's movement points.
    pub fn move_unit(&mut self, unit: UnitId, destination: Coord) -> Result<(), ActionError> {
        self.try_move_unit(unit, destination)
            .inspect_err(|err| debug!(unit, %destination, %err, "move rejected"))
    }

    fn try_move_unit(&mut self, id: UnitId, destination: Coord) -> Result<(), ActionError> {
        let unit = self.acting_unit(id)?;
        let blocked = self
            .map
            .occupant(destination)
            .is_some_and(|other| other != id);
        if destination == unit.position || !self.map.is_passable(destination) || blocked {
            return Err(ActionError::TileNotAllowed(destination));
        }

        let reach = compute_reachable(&self.map, unit);
        let Some(path) = reach.path(destination) else {
            let mut unbounded = unit.clone();
            unbounded.moves = u32::try_from(self.map.area()).unwrap_or(u32::MAX);
            return Err(
                match compute_reachable(&self.map, &unbounded).cost(destination) {
                    Some(needed) => ActionError::InsufficientMoves {
                        needed,
                        available: unit.moves,
                    },
                    None => ActionError::NoPath,
                },
            );
        };

        let path = path.to_vec();
        self.try_move_along(id, &path).map(|_| ())
    }

    /// Walk a unit along an explicit path, one movement point per step.
    ///
    /// The path may start with the unit's own tile. The walk stops at the
    /// first step that is not adjacent, not passable or not affordable, and
    /// the unit ends on the farthest unoccupied tile it walked. Returns that
    /// tile.
    ///
    /// # Errors
    ///
    /// Rejects units of other players, and paths whose walkable prefix has no
    /// free tile to stop on.
    pub fn move_along(&mut self, unit: UnitId, path: &[Coord]) -> Result<Coord, ActionError> {
        self.try_move_along(unit, path)
            .inspect_err(|err| debug!(unit, steps = path.len(), %err, "move rejected"))
    }

    fn try_move_along(&mut self, id: UnitId, path: &[Coord]) -> Result<Coord, ActionError> {
        let unit = self.acting_unit(id)?;
        let steps = path.strip_prefix(&[unit.position]).unwrap_or(path);

        let mut walker = unit.clone();
        let mut landing = None;
        let mut failure = None;
        for &step in steps {
            if !walker.can_step(step, self.map.is_passable(step)) {
                failure = Some(if walker.moves == 0 {
                    ActionError::InsufficientMoves {
                        needed: 1,
                        available: 0,
                    }
                } else {
                    ActionError::TileNotAllowed(step)
                });
                break;
            }
            walker.spend_moves(1);
            walker.position = step;
            if self.map.occupant(step).is_none_or(|other| other == id) {
                landing = Some((step, unit.moves - walker.moves));
            }
        }

        let Some((destination, cost)) = landing else {
            return Err(failure.unwrap_or(ActionError::NoPath));
        };
        self.relocate(id, destination, cost);
        debug!(unit = id, %destination, cost, "unit moved");
        Ok(destination)
    }

    fn relocate(&mut self, id: UnitId, destination: Coord, cost: u32) {
        if let Some(unit) = self.units.get_mut(&id) {
            self.map.clear_occupant(unit.position, id);
            unit.position = destination;
            unit.spend_moves(cost);
            self.map.set_occupant(destination, id);
        }
    }

    /// Attack `target` with `attacker`.
    ///
    /// # Errors
    ///
    /// Returns the first failed attack precondition; see
    /// [`validate_attack`](crate::game::validate_attack).
    pub fn attack(
        &mut self,
        attacker: UnitId,
        target: UnitId,
    ) -> Result<AttackOutcome, ActionError> {
        self.try_attack(attacker, target)
            .inspect_err(|err| debug!(attacker, target, %err, "attack rejected"))
    }

    /// Attack whatever unit stands on `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::NoTarget`] for an empty tile, otherwise as
    /// [`GameState::attack`].
    pub fn attack_at(&mut self, attacker: UnitId, coord: Coord) -> Result<AttackOutcome, ActionError> {
        let Some(target) = self.map.occupant(coord) else {
            let err = ActionError::NoTarget(coord);
            debug!(attacker, %coord, %err, "attack rejected");
            return Err(err);
        };
        self.attack(attacker, target)
    }

    fn try_attack(&mut self, attacker: UnitId, target: UnitId) -> Result<AttackOutcome, ActionError> {
        let current = self.current_player();
        let attacking = self
            .units
            .get(&attacker)
            .ok_or(ActionError::UnknownUnit(attacker))?;
        let defending = self
            .units
            .get(&target)
            .ok_or(ActionError::UnknownUnit(target))?;
        validate_attack(attacking, defending, current)?;

        let mut defending = self
            .units
            .remove(&target)
            .ok_or(ActionError::UnknownUnit(target))?;
        let Some(attacking) = self.units.get_mut(&attacker) else {
            self.units.insert(target, defending);
            return Err(ActionError::UnknownUnit(attacker));
        };
        let outcome = resolve_attack(attacking, &mut defending);

        match outcome.resolution {
            Resolution::Damaged { hp } => {
                debug!(attacker, target, damage = outcome.damage, hp, "unit damaged");
                self.units.insert(target, defending);
            }
            Resolution::Destroyed => {
                self.map.clear_occupant(defending.position, target);
                if let Some(owner) = self.players.get_mut(&defending.owner) {
                    owner.remove_unit(target);
                }
                info!(attacker, target, kind = %defending.kind, "unit destroyed");
            }
            Resolution::Captured { from, to } => {
                if let Some(loser) = self.players.get_mut(&from) {
                    loser.remove_unit(target);
                }
                if let Some(winner) = self.players.get_mut(&to) {
                    winner.add_unit(target);
                }
                info!(attacker, target, from, to, kind = %defending.kind, "unit captured");
                self.units.insert(target, defending);
            }
        }

        Ok(outcome)
    }

    /// Found a city with a settler, consuming the unit.
    ///
    /// # Errors
    ///
    /// Rejects units of other players, kinds that cannot found cities and
    /// sites failing [`can_found_city`](crate::game::can_found_city).
    pub fn found_city(&mut self, unit: UnitId) -> Result<CityId, ActionError> {
        self.try_found_city(unit)
            .inspect_err(|err| debug!(unit, %err, "city founding rejected"))
    }

    fn try_found_city(&mut self, id: UnitId) -> Result<CityId, ActionError> {
        let unit = self.acting_unit(id)?;
        if !unit.capabilities().can_found_city {
            return Err(ActionError::CannotFoundCity(unit.kind));
        }
        let (owner, position) = (unit.owner, unit.position);
        can_found_city(&self.map, self.cities.values(), position, self.rules.min_spacing)?;

        let city_id = self.next_city_id;
        self.next_city_id += 1;
        let mut city = City::new(city_id, owner, position, None);
        city.claim_center(&mut self.map);
        city.update(&mut self.map, self.rules.work_radius);

        self.map.clear_occupant(position, id);
        self.units.remove(&id);
        if let Some(player) = self.players.get_mut(&owner) {
            player.remove_unit(id);
            player.add_city(city_id);
        }
        info!(city = city_id, owner, %position, name = %city.name, "city founded");
        self.cities.insert(city_id, city);

        Ok(city_id)
    }

    /// Set a city's population and re-balance its worked tiles.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::UnknownCity`] if the city does not exist.
    pub fn set_city_population(&mut self, id: CityId, population: u32) -> Result<(), ActionError> {
        let city = self
            .cities
            .get_mut(&id)
            .ok_or(ActionError::UnknownCity(id))?;
        city.set_population(population);
        city.update(&mut self.map, self.rules.work_radius);
        debug!(
            city = id,
            population = city.population,
            worked = city.worked.len(),
            "city population changed"
        );
        Ok(())
    }

    /// Remove a city and release all of its tiles.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::UnknownCity`] if the city does not exist.
    pub fn remove_city(&mut self, id: CityId) -> Result<City, ActionError> {
        let mut city = self
            .cities
            .remove(&id)
            .ok_or(ActionError::UnknownCity(id))?;
        city.release_all(&mut self.map);
        if let Some(player) = self.players.get_mut(&city.owner) {
            player.remove_city(id);
        }
        info!(city = id, name = %city.name, "city removed");
        Ok(city)
    }

    /// End `player`'s turn.
    ///
    /// When every player has finished, a new round starts and every unit
    /// gets its movement points back.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::UnknownPlayer`] for unregistered players.
    pub fn end_turn(&mut self, player: PlayerId) -> Result<TurnOutcome, ActionError> {
        if !self.players.contains_key(&player) {
            let err = ActionError::UnknownPlayer(player);
            debug!(player, %err, "end turn rejected");
            return Err(err);
        }

        let outcome = self.turns.end_turn(player);
        match outcome {
            TurnOutcome::RoundAdvanced { round } => {
                self.reset_units();
                info!(round, "round advanced");
            }
            TurnOutcome::Passed { next } => debug!(player, next, "turn passed"),
        }
        Ok(outcome)
    }

    /// End the current player's turn if they own units and none can move.
    pub fn auto_end_on_exhaustion(&mut self) -> Option<TurnOutcome> {
        let current = self.current_player();
        let player = self.players.get(&current)?;
        if !player.is_out_of_moves(self.units.values()) {
            return None;
        }
        debug!(player = current, "all units exhausted");
        self.end_turn(current).ok()
    }

    /// Start a new round immediately, regardless of who has finished.
    ///
    /// Returns the new round number.
    pub fn advance_round(&mut self) -> u32 {
        self.turns.advance_round();
        self.reset_units();
        info!(round = self.turns.round(), "round advanced");
        self.turns.round()
    }

    fn reset_units(&mut self) {
        for unit in self.units.values_mut() {
            unit.reset_round();
        }
    }

    /// The unit, if it exists and belongs to the acting player.
    fn acting_unit(&self, id: UnitId) -> Result<&Unit, ActionError> {
        let unit = self.units.get(&id).ok_or(ActionError::UnknownUnit(id))?;
        let current = self.current_player();
        if unit.owner != current {
            return Err(ActionError::NotYourTurn {
                owner: unit.owner,
                current,
            });
        }
        Ok(unit)
    }
}
