//! Wiring networks discovered by flood fill and the arena that owns them.

use std::collections::{HashSet, VecDeque};

use ant_factory_core::{ConfigurationError, NetworkId, Position};

use crate::{
    grid::{Grid, TileAddress},
    tile::{Tile, Wire},
    Stage,
};

/// Group of connected tiles sharing one wiring template and one activation.
///
/// Membership is fixed once discovered; only the activation flag changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Network {
    members: Vec<TileAddress>,
    active: bool,
}

impl Network {
    /// Flood-fills the network containing the tile at `start`.
    ///
    /// From every member the search follows each side set in its connection
    /// mask and joins the first unvisited tile in the neighbouring stack that
    /// shares the member's template and connects back on the opposite side.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NotConnected`] when `start` does not
    /// address a connected tile.
    pub fn discover(grid: &Grid<Tile>, start: TileAddress) -> Result<Self, ConfigurationError> {
        if grid.tile(start).and_then(Tile::wire).is_none() {
            return Err(ConfigurationError::NotConnected {
                position: start.position(),
                index: start.index(),
            });
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut members = Vec::new();
        let _ = visited.insert(start);
        queue.push_back(start);

        while let Some(address) = queue.pop_front() {
            members.push(address);
            let Some(wire) = grid.tile(address).and_then(Tile::wire) else {
                continue;
            };

            for side in wire.connections().directions() {
                let neighbour = address.position().step(side);
                let back = side.opposite();
                let found = grid
                    .stack(neighbour)
                    .iter()
                    .enumerate()
                    .find(|(index, tile)| {
                        let candidate = TileAddress::new(neighbour, *index);
                        !visited.contains(&candidate)
                            && tile.wire().map_or(false, |other| {
                                other.same_template(wire) && other.connections().contains(back)
                            })
                    })
                    .map(|(index, _)| TileAddress::new(neighbour, index));

                if let Some(candidate) = found {
                    let _ = visited.insert(candidate);
                    queue.push_back(candidate);
                }
            }
        }

        Ok(Self {
            members,
            active: false,
        })
    }

    /// Builds the network reached from stack slot `index` at `(x, y)`,
    /// registers it with the stage and points every member at it.
    ///
    /// Rebuilding from a tile that already belongs to a network reuses that
    /// network's id. Any other network a member belonged to is retired: it
    /// loses its members and no longer shows up in [`Networks::iter`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NotConnected`] when the addressed tile
    /// carries no wiring.
    pub fn build_from(
        stage: &mut Stage,
        x: i32,
        y: i32,
        index: usize,
    ) -> Result<NetworkId, ConfigurationError> {
        let start = TileAddress::new(Position::new(x, y), index);
        let mut network = Self::discover(&stage.grid, start)?;
        let _ = network.update(&stage.grid);

        let id = stage
            .grid
            .tile(start)
            .and_then(Tile::wire)
            .and_then(Wire::network)
            .filter(|existing| stage.networks.get(*existing).is_some())
            .unwrap_or_else(|| stage.networks.next_id());
        for address in &network.members {
            if let Some(wire) = stage.grid.tile_mut(*address).and_then(Tile::wire_mut) {
                if let Some(previous) = wire.network().filter(|previous| *previous != id) {
                    stage.networks.retire(previous);
                }
                wire.set_network(id);
            }
        }
        stage.networks.insert(id, network);
        Ok(id)
    }

    /// Addresses of every member tile, in discovery order.
    #[must_use]
    pub fn members(&self) -> &[TileAddress] {
        &self.members
    }

    /// Number of member tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Reports whether the network has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Activation computed by the last update.
    #[must_use]
    pub const fn active(&self) -> bool {
        self.active
    }

    /// Recomputes the activation from the member inputs.
    ///
    /// Returns `true` when the activation changed.
    pub fn update(&mut self, grid: &Grid<Tile>) -> bool {
        let active = self.members.iter().any(|address| {
            grid.tile(*address).map_or(false, |tile| {
                tile.is_input() && tile.wire().map_or(false, |wire| wire.active())
            })
        });
        let changed = active != self.active;
        self.active = active;
        changed
    }
}

/// Arena owning every network of a stage, indexed by [`NetworkId`].
#[derive(Clone, Debug, Default)]
pub struct Networks {
    networks: Vec<Network>,
}

impl Networks {
    /// Network registered under `id`.
    #[must_use]
    pub fn get(&self, id: NetworkId) -> Option<&Network> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.networks.get(index))
    }

    /// Activation of an optional network handle; unattached tiles are inactive.
    #[must_use]
    pub fn is_active(&self, id: Option<NetworkId>) -> bool {
        id.and_then(|id| self.get(id))
            .map_or(false, Network::active)
    }

    /// Number of registered networks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    /// Reports whether no networks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Iterates over every live network with its identifier.
    ///
    /// Networks retired by a rebuild are skipped.
    pub fn iter(&self) -> impl Iterator<Item = (NetworkId, &Network)> {
        self.networks
            .iter()
            .enumerate()
            .filter(|(_, network)| !network.is_empty())
            .map(|(index, network)| (network_id(index), network))
    }

    /// Recomputes every activation and returns the networks that flipped.
    pub(crate) fn update_all(&mut self, grid: &Grid<Tile>) -> Vec<(NetworkId, bool)> {
        let mut changes = Vec::new();
        for (index, network) in self.networks.iter_mut().enumerate() {
            if network.update(grid) {
                changes.push((network_id(index), network.active));
            }
        }
        changes
    }

    fn next_id(&self) -> NetworkId {
        network_id(self.networks.len())
    }

    fn insert(&mut self, id: NetworkId, network: Network) {
        match usize::try_from(id.get())
            .ok()
            .and_then(|index| self.networks.get_mut(index))
        {
            Some(slot) => *slot = network,
            None => self.networks.push(network),
        }
    }

    fn retire(&mut self, id: NetworkId) {
        if let Some(network) = usize::try_from(id.get())
            .ok()
            .and_then(|index| self.networks.get_mut(index))
        {
            network.members.clear();
            network.active = false;
        }
    }
}

fn network_id(index: usize) -> NetworkId {
    NetworkId::new(u32::try_from(index).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use ant_factory_core::ConnectionMask;

    use super::*;
    use crate::tile::{Wire, WireTemplate};

    fn cable(template: &Rc<WireTemplate>, bits: u8) -> Tile {
        Tile::Cable(Wire::new(Rc::clone(template), ConnectionMask::new(bits)))
    }

    #[test]
    fn differently_coloured_wires_do_not_merge() {
        let blue = Rc::new(WireTemplate::cable("blue"));
        let red = Rc::new(WireTemplate::cable("red"));
        let mut grid = Grid::new(2, 1);
        grid.push(0, 0, cable(&blue, 0b0010));
        grid.push(0, 0, cable(&red, 0b0010));
        grid.push(1, 0, cable(&red, 0b1000));
        grid.push(1, 0, cable(&blue, 0b1000));

        let network = Network::discover(&grid, TileAddress::new(Position::new(0, 0), 0))
            .expect("blue cable is connected");

        assert_eq!(
            network.members(),
            &[
                TileAddress::new(Position::new(0, 0), 0),
                TileAddress::new(Position::new(1, 0), 1),
            ]
        );
    }

    #[test]
    fn one_sided_connection_is_a_dead_end() {
        let blue = Rc::new(WireTemplate::cable("blue"));
        let mut grid = Grid::new(2, 1);
        grid.push(0, 0, cable(&blue, 0b0010));
        grid.push(1, 0, cable(&blue, 0b0001));

        let network = Network::discover(&grid, TileAddress::new(Position::new(0, 0), 0))
            .expect("cable is connected");

        assert_eq!(network.len(), 1);
    }

    #[test]
    fn unwired_start_is_rejected() {
        let mut grid = Grid::new(1, 1);
        grid.push(0, 0, Tile::Ground);

        let error = Network::discover(&grid, TileAddress::new(Position::new(0, 0), 0))
            .expect_err("ground carries no wiring");

        assert_eq!(
            error,
            ConfigurationError::NotConnected {
                position: Position::new(0, 0),
                index: 0,
            }
        );
    }

    #[test]
    fn missing_network_is_inactive() {
        let networks = Networks::default();

        assert!(!networks.is_active(None));
        assert!(!networks.is_active(Some(NetworkId::new(3))));
    }
}
