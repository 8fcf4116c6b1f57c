//! Per-turn behaviour of tiles that sense ants, read neighbours or move items.

use ant_factory_core::{Direction, Event, ItemKind, Position};

use crate::{
    grid::TileAddress,
    tile::{CraneArm, GateOp, Tile, Wire},
    MovePolicy, Stage,
};

/// Work a tile asks for, captured before the stage is mutated.
enum Step {
    Sense,
    Gate { op: GateOp, sides: Vec<Direction> },
    Latch { set: Direction, reset: Direction },
    Belt { direction: Direction, item: Option<ItemKind> },
    Crane { side: Direction, arm: CraneArm, held: Option<ItemKind> },
    Machine { output: Direction, ready: Option<ItemKind>, crafted: bool },
    Idle,
}

impl Stage {
    /// Runs every tile's update in raster order, bottom of stack first.
    pub(crate) fn update_tiles(&mut self) {
        let positions: Vec<Position> = self.grid.positions().collect();
        for position in positions {
            for index in 0..self.grid.stack(position).len() {
                self.update_tile(TileAddress::new(position, index));
            }
        }
    }

    fn update_tile(&mut self, address: TileAddress) {
        let position = address.position();
        let step = match self.grid.tile(address) {
            Some(Tile::Button(_) | Tile::Switch(_) | Tile::Clock(_)) => Step::Sense,
            Some(Tile::Gate(gate)) => Step::Gate {
                op: gate.op(),
                sides: gate.inputs().directions().collect(),
            },
            Some(Tile::RsLatch(latch)) => Step::Latch {
                set: latch.set,
                reset: latch.reset,
            },
            Some(Tile::Belt(belt)) if self.powered(&belt.wire) => Step::Belt {
                direction: belt.direction(),
                item: belt.item(),
            },
            Some(Tile::Crane(crane)) if self.powered(&crane.wire) && !crane.rotating => {
                Step::Crane {
                    side: match crane.arm() {
                        CraneArm::Pickup => crane.pickup(),
                        CraneArm::Drop => crane.drop_side(),
                    },
                    arm: crane.arm(),
                    held: crane.held(),
                }
            }
            Some(Tile::Machine(machine)) => Step::Machine {
                output: machine.output(),
                ready: machine.product(),
                crafted: machine.recipe().is_satisfied(machine.stock()),
            },
            _ => Step::Idle,
        };

        match step {
            Step::Sense => {
                let occupied = self.ant_index_at(position).is_some();
                match self.grid.tile_mut(address) {
                    Some(Tile::Button(wire)) => wire.set_active(occupied),
                    Some(Tile::Switch(switch)) => switch.sense(occupied),
                    Some(Tile::Clock(clock)) => clock.tick(),
                    _ => {}
                }
            }
            Step::Gate { op, sides } => {
                let levels: Vec<bool> = sides
                    .into_iter()
                    .map(|side| self.side_active(position, side))
                    .collect();
                if let Some(wire) = self.grid.tile_mut(address).and_then(Tile::wire_mut) {
                    wire.set_active(op.evaluate(&levels));
                }
            }
            Step::Latch { set, reset } => {
                let set = self.side_active(position, set);
                let reset = self.side_active(position, reset);
                if let Some(Tile::RsLatch(latch)) = self.grid.tile_mut(address) {
                    latch.latch(set, reset);
                }
            }
            Step::Belt { direction, item } => {
                if let Some(item) = item {
                    if self.deliver_item(position, position.step(direction), item) {
                        if let Some(Tile::Belt(belt)) = self.grid.tile_mut(address) {
                            belt.item = None;
                        }
                    }
                }
                if let Some(rider) = self.ant_index_at(position) {
                    let (dx, dy) = direction.delta();
                    let _ = self.move_at(rider, dx, dy, MovePolicy::Push);
                }
            }
            Step::Crane { side, arm, held } => {
                let neighbour = position.step(side);
                let held = match (arm, held) {
                    (CraneArm::Pickup, None) => self.take_from(position, neighbour),
                    (CraneArm::Drop, Some(item)) => {
                        if self.deliver_item(position, neighbour, item) {
                            None
                        } else {
                            Some(item)
                        }
                    }
                    (_, held) => held,
                };
                if let Some(Tile::Crane(crane)) = self.grid.tile_mut(address) {
                    crane.held = held;
                    crane.rotating = match crane.arm {
                        CraneArm::Pickup => held.is_some(),
                        CraneArm::Drop => held.is_none(),
                    };
                }
            }
            Step::Machine {
                output,
                ready,
                crafted,
            } => {
                if let Some(product) = ready {
                    if self.deliver_item(position, position.step(output), product) {
                        if let Some(Tile::Machine(machine)) = self.grid.tile_mut(address) {
                            machine.product = None;
                        }
                    }
                } else if crafted {
                    if let Some(Tile::Machine(machine)) = self.grid.tile_mut(address) {
                        machine.stock.clear();
                        machine.product = Some(machine.recipe.product());
                    }
                }
            }
            Step::Idle => {}
        }
    }

    /// Belts and cranes run when unwired or when their network is active.
    fn powered(&self, wire: &Wire) -> bool {
        wire.network()
            .map_or(true, |network| self.networks.is_active(Some(network)))
    }

    /// Reports whether a wire on the `side` neighbour of `position` connects
    /// back toward it and belongs to an active network.
    fn side_active(&self, position: Position, side: Direction) -> bool {
        let back = side.opposite();
        self.grid
            .stack(position.step(side))
            .iter()
            .filter_map(Tile::wire)
            .any(|wire| wire.connections().contains(back) && self.networks.is_active(wire.network()))
    }

    /// Hands `item` from `from` to the first handler at `to` that accepts it.
    fn deliver_item(&mut self, from: Position, to: Position, item: ItemKind) -> bool {
        let dx = to.x() - from.x();
        let dy = to.y() - from.y();
        let Some(stack) = self.grid.stack_mut(to) else {
            return false;
        };
        let Some(tile) = stack.iter_mut().find(|tile| tile.accepts_item(item, dx, dy)) else {
            return false;
        };

        tile.give_item(item, dx, dy);
        self.events.push(Event::ItemMoved { item, from, to });
        true
    }

    /// Takes an item from the first handler at `from` offering one to `to`.
    fn take_from(&mut self, to: Position, from: Position) -> Option<ItemKind> {
        let dx = to.x() - from.x();
        let dy = to.y() - from.y();
        let item = self
            .grid
            .stack_mut(from)?
            .iter_mut()
            .find_map(|tile| tile.take_item(dx, dy))?;
        self.events.push(Event::ItemMoved { item, from, to });
        Some(item)
    }
}
