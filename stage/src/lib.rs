#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative stage state and the turn engine for Ant Factory.
//!
//! A [`Stage`] owns one level: the tile grid, its ants, the wiring networks,
//! the pheromone overlay and the double-buffered laser grids. Adapters feed it
//! one [`Intent`] per turn through [`Stage::advance_turn`] and read the result
//! through the [`query`] module and the returned [`TurnReport`].

mod ant;
mod devices;
mod factory;
mod grid;
mod items;
mod laser;
mod movement;
mod network;
mod pheromone;
pub mod query;
mod tile;
mod turn;

pub use ant::{Ant, MovePolicy};
pub use factory::{TileArgs, TileFactory, DEFAULT_COLOR};
pub use grid::{Grid, LaserGrid, Layer, TileAddress};
pub use items::{recipe_for, Recipe};
pub use laser::{bounce, send_laser, LaserResponse, MAX_LASER_STEPS, MIRROR_BOUNCE};
pub use network::{Network, Networks};
pub use pheromone::{Pheromone, PheromoneGrid};
pub use tile::{
    AntRemains, Belt, Clock, Crane, CraneArm, Gate, GateOp, Help, LaserMachine, Machine, Mirror,
    MirrorDiagonal, Passage, RsLatch, Spike, Switch, Tile, Wire, WireTemplate,
};
pub use turn::TurnReport;

use ant_factory_core::{AntId, ConfigurationError, Event, Intent, NetworkId, Position};

/// Fixed link from a cell to a position in another level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warp {
    at: Position,
    target: WarpTarget,
}

impl Warp {
    /// Cell that triggers the warp.
    #[must_use]
    pub const fn at(&self) -> Position {
        self.at
    }

    /// Destination of the warp.
    #[must_use]
    pub const fn target(&self) -> &WarpTarget {
        &self.target
    }
}

/// Destination reached by a warp or an open passage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WarpTarget {
    level: String,
    position: Option<Position>,
}

impl WarpTarget {
    /// Creates a destination in `level`, optionally pinned to a cell.
    #[must_use]
    pub fn new(level: impl Into<String>, position: Option<Position>) -> Self {
        Self {
            level: level.into(),
            position,
        }
    }

    /// Name of the destination level.
    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    /// Arrival cell; `None` keeps the destination's controlled ant in place.
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        self.position
    }
}

/// Location and destination of a passage tile, used to resolve openness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassageSite {
    address: TileAddress,
    target: WarpTarget,
}

impl PassageSite {
    /// Address of the passage tile.
    #[must_use]
    pub const fn address(&self) -> TileAddress {
        self.address
    }

    /// Where the passage leads.
    #[must_use]
    pub const fn target(&self) -> &WarpTarget {
        &self.target
    }
}

/// One level's authoritative simulation state.
#[derive(Clone, Debug)]
pub struct Stage {
    pub(crate) grid: Grid<Tile>,
    pub(crate) ants: Vec<Ant>,
    pub(crate) controlled: Option<usize>,
    pub(crate) networks: Networks,
    pub(crate) pheromones: PheromoneGrid,
    pub(crate) laser: LaserGrid,
    pub(crate) previous_laser: LaserGrid,
    pub(crate) warps: Vec<Warp>,
    pub(crate) turn: u64,
    pub(crate) next_ant_id: u32,
    pub(crate) events: Vec<Event>,
    pub(crate) turn_start: Vec<(AntId, Position)>,
}

impl Stage {
    /// Creates an empty stage of the given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            grid: Grid::new(width, height),
            ants: Vec::new(),
            controlled: None,
            networks: Networks::default(),
            pheromones: PheromoneGrid::new(width, height),
            laser: LaserGrid::new(width, height),
            previous_laser: LaserGrid::new(width, height),
            warps: Vec::new(),
            turn: 0,
            next_ant_id: 0,
            events: Vec::new(),
            turn_start: Vec::new(),
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Number of turns committed so far.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Tile grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid<Tile> {
        &self.grid
    }

    /// Mutable tile grid for loaders.
    ///
    /// Rebuild networks after changing wiring.
    #[must_use]
    pub fn grid_mut(&mut self) -> &mut Grid<Tile> {
        &mut self.grid
    }

    /// Network arena.
    #[must_use]
    pub const fn networks(&self) -> &Networks {
        &self.networks
    }

    /// Pheromone overlay.
    #[must_use]
    pub const fn pheromones(&self) -> &PheromoneGrid {
        &self.pheromones
    }

    /// Mutable pheromone overlay painted by the input collaborator.
    #[must_use]
    pub fn pheromones_mut(&mut self) -> &mut PheromoneGrid {
        &mut self.pheromones
    }

    /// Ants in sequence order.
    #[must_use]
    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    /// Ant currently receiving intents.
    #[must_use]
    pub fn controlled_ant(&self) -> Option<&Ant> {
        self.controlled.and_then(|index| self.ants.get(index))
    }

    /// Places `tile` on top of the stack at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::OutOfBounds`] when `position` lies
    /// outside the stage.
    pub fn place(&mut self, position: Position, tile: Tile) -> Result<(), ConfigurationError> {
        let stack = self
            .grid
            .stack_mut(position)
            .ok_or(ConfigurationError::OutOfBounds { position })?;
        stack.push(tile);
        Ok(())
    }

    /// Adds an ant at `position`, optionally taking control of it.
    ///
    /// The first ant spawned always becomes the controlled one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::OutOfBounds`] when `position` lies
    /// outside the stage.
    pub fn spawn_ant(
        &mut self,
        position: Position,
        controlled: bool,
    ) -> Result<AntId, ConfigurationError> {
        if !self.grid.contains(position.x(), position.y()) {
            return Err(ConfigurationError::OutOfBounds { position });
        }

        let id = AntId::new(self.next_ant_id);
        self.next_ant_id += 1;
        self.ants.push(Ant::new(id, position));
        if controlled || self.controlled.is_none() {
            self.controlled = Some(self.ants.len() - 1);
        }
        Ok(id)
    }

    /// Builds networks for every wired tile not yet attached to one.
    ///
    /// # Errors
    ///
    /// Propagates failures from [`Network::build_from`].
    pub fn discover_networks(&mut self) -> Result<Vec<NetworkId>, ConfigurationError> {
        let positions: Vec<Position> = self.grid.positions().collect();
        let mut built = Vec::new();
        for position in positions {
            for index in 0..self.grid.stack(position).len() {
                let address = TileAddress::new(position, index);
                let unattached = self
                    .grid
                    .tile(address)
                    .and_then(Tile::wire)
                    .map_or(false, |wire| wire.network().is_none());
                if unattached {
                    built.push(Network::build_from(self, position.x(), position.y(), index)?);
                }
            }
        }
        Ok(built)
    }

    /// Folds the passability of every tile at `(x, y)`, bottom to top.
    ///
    /// Empty and out-of-range cells are impassable.
    #[must_use]
    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.grid
            .get(x, y)
            .iter()
            .fold(false, |passable, tile| {
                tile.passability(&self.networks).fold(passable)
            })
    }

    /// Ant standing on `position`.
    #[must_use]
    pub fn ant_at(&self, position: Position) -> Option<&Ant> {
        self.ants.iter().find(|ant| ant.position == position)
    }

    pub(crate) fn ant_index_at(&self, position: Position) -> Option<usize> {
        self.ants.iter().position(|ant| ant.position == position)
    }

    /// Makes the ant on `position` the controlled one.
    ///
    /// Returns `false`, leaving control untouched, when the cell is empty.
    pub fn select_ant_at(&mut self, position: Position) -> bool {
        match self.ant_index_at(position) {
            Some(index) => {
                self.transfer_control(Some(index));
                true
            }
            None => false,
        }
    }

    /// Passes control to the nearest other ant.
    ///
    /// Distance is Manhattan; ties go to the earlier ant in sequence order.
    /// Returns the newly controlled ant, or `None` when nobody else is left.
    pub fn swap_ant(&mut self) -> Option<AntId> {
        let current = self.controlled?;
        let origin = self.ants.get(current)?.position;
        let next = self.nearest_ant(origin, Some(current))?;
        self.transfer_control(Some(next));
        self.ants.get(next).map(Ant::id)
    }

    pub(crate) fn nearest_ant(&self, origin: Position, skip: Option<usize>) -> Option<usize> {
        self.ants
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != skip)
            .min_by_key(|(_, ant)| ant.position.manhattan_distance(origin))
            .map(|(index, _)| index)
    }

    pub(crate) fn transfer_control(&mut self, next: Option<usize>) {
        let from = self.controlled_ant().map(Ant::id);
        self.controlled = next;
        let to = self.controlled_ant().map(Ant::id);
        if from != to {
            tracing::debug!(?from, ?to, "control transferred");
            self.events.push(Event::ControlTransferred { from, to });
        }
    }

    /// Registers a warp from `at` into `target`.
    pub fn add_warp(&mut self, at: Position, target: WarpTarget) {
        self.warps.push(Warp { at, target });
    }

    /// Registered warps.
    #[must_use]
    pub fn warps(&self) -> &[Warp] {
        &self.warps
    }

    /// Warp or open passage under the controlled ant.
    #[must_use]
    pub fn active_warp(&self) -> Option<WarpTarget> {
        let position = self.controlled_ant()?.position;
        if let Some(warp) = self.warps.iter().find(|warp| warp.at == position) {
            return Some(warp.target.clone());
        }

        self.grid.stack(position).iter().find_map(|tile| match tile {
            Tile::Passage(passage) if passage.is_open() => Some(WarpTarget::new(
                passage.level(),
                passage.target(),
            )),
            _ => None,
        })
    }

    /// Help message under the controlled ant.
    #[must_use]
    pub fn active_help(&self) -> Option<&str> {
        let position = self.controlled_ant()?.position;
        self.grid.stack(position).iter().find_map(|tile| match tile {
            Tile::Help(help) => Some(help.message()),
            _ => None,
        })
    }

    /// Every passage tile on the stage.
    #[must_use]
    pub fn passages(&self) -> Vec<PassageSite> {
        let mut sites = Vec::new();
        for (position, stack) in self.grid.iter() {
            for (index, tile) in stack.iter().enumerate() {
                if let Tile::Passage(passage) = tile {
                    sites.push(PassageSite {
                        address: TileAddress::new(position, index),
                        target: WarpTarget::new(passage.level(), passage.target()),
                    });
                }
            }
        }
        sites
    }

    /// Opens or closes the passage at `address`.
    ///
    /// Returns `false` when no passage lives there.
    pub fn set_passage_open(&mut self, address: TileAddress, open: bool) -> bool {
        match self.grid.tile_mut(address) {
            Some(Tile::Passage(passage)) => {
                passage.open = open;
                true
            }
            _ => false,
        }
    }

    /// Reports whether an arriving ant could stand on `position`.
    #[must_use]
    pub fn can_receive(&self, position: Position) -> bool {
        self.is_passable(position.x(), position.y()) && self.ant_at(position).is_none()
    }

    /// Moves the controlled ant onto `position` if it can stand there.
    pub fn teleport_controlled(&mut self, position: Position) -> bool {
        if !self.can_receive(position) {
            return false;
        }
        let Some(ant) = self.controlled.and_then(|index| self.ants.get_mut(index)) else {
            return false;
        };
        ant.position = position;
        ant.waited = false;
        true
    }

    /// Network id and activation for every network, for renderers.
    #[must_use]
    pub fn network_states(&self) -> Vec<(NetworkId, bool)> {
        self.networks
            .iter()
            .map(|(id, network)| (id, network.active()))
            .collect()
    }

    /// Runs one complete turn with `intent` applied to the controlled ant.
    pub fn advance_turn(&mut self, intent: Intent) -> TurnReport {
        self.kill_ants();
        self.apply_intent(intent);
        self.update();
        self.cleanup();
        TurnReport::new(self.turn, self.take_events())
    }
}

/// Plays one turn of `stage` with `intent`, appending what changed to
/// `out_events`.
pub fn apply(stage: &mut Stage, intent: Intent, out_events: &mut Vec<Event>) {
    out_events.extend(stage.advance_turn(intent).into_events());
}
