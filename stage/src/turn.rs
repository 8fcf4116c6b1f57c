//! The per-turn protocol: hazard pre-check, intents, update and cleanup.

use ant_factory_core::{Event, Hazard, Intent, Orientation, Position};

use crate::{
    ant::Ant,
    laser::send_laser,
    tile::{AntRemains, Tile},
    MovePolicy, Stage,
};

/// Everything a committed turn changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    turn: u64,
    events: Vec<Event>,
}

impl TurnReport {
    pub(crate) const fn new(turn: u64, events: Vec<Event>) -> Self {
        Self { turn, events }
    }

    /// Number of turns committed, this one included.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Events in the order they happened.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Consumes the report, yielding its events.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl Stage {
    /// Flags every ant standing on an armed spike or in last turn's beam.
    pub fn kill_ants(&mut self) {
        self.turn_start = self.ants.iter().map(|ant| (ant.id, ant.position)).collect();

        for ant in &mut self.ants {
            let stack = self.grid.stack(ant.position);
            if stack.iter().any(Tile::is_armed_spike) {
                ant.spiked = true;
            } else if !self.previous_laser.at(ant.position).is_empty() {
                ant.lasered = true;
            }
        }
    }

    /// Applies the adapter's intent to the controlled ant, swapping with any
    /// ant in the way.
    pub fn apply_intent(&mut self, intent: Intent) {
        let Some(index) = self.controlled else {
            return;
        };
        if let Intent::Move { dx, dy } = intent {
            let _ = self.move_at(index, dx, dy, MovePolicy::Swap);
        }
    }

    /// Moves AI ants, updates tiles and networks, then fires lasers.
    pub fn update(&mut self) {
        self.run_ants();
        self.update_tiles();

        for (network, active) in self.networks.update_all(&self.grid) {
            tracing::debug!(network = network.get(), active, "network changed");
            self.events.push(Event::NetworkChanged { network, active });
        }

        let emitters: Vec<(Position, Orientation)> = self
            .grid
            .iter()
            .flat_map(|(position, stack)| {
                stack.iter().filter_map(move |tile| match tile {
                    Tile::LaserMachine(machine) => Some((position, machine)),
                    _ => None,
                })
            })
            .filter(|(_, machine)| self.networks.is_active(machine.wire.network()))
            .map(|(position, machine)| (position, machine.orientation()))
            .collect();

        for (origin, orientation) in emitters {
            send_laser(
                &mut self.grid,
                &self.networks,
                &mut self.laser,
                origin,
                orientation,
            );
        }
    }

    fn run_ants(&mut self) {
        for index in 0..self.ants.len() {
            if Some(index) == self.controlled {
                continue;
            }
            let Some(ant) = self.ants.get_mut(index) else {
                continue;
            };
            if !ant.can_move() {
                continue;
            }
            let pheromone = self.pheromones.at(ant.position);
            let Some(direction) = pheromone.direction() else {
                continue;
            };
            if pheromone.wait() && !ant.waited {
                ant.waited = true;
                continue;
            }

            let (dx, dy) = direction.delta();
            let _ = self.move_at(index, dx, dy, MovePolicy::Push);
        }
    }

    /// Removes dead ants, swaps the laser buffers and commits tile state.
    pub fn cleanup(&mut self) {
        for (position, stack) in self.grid.iter() {
            for mask in stack.iter().filter_map(Tile::laser_hits) {
                if !mask.is_empty() {
                    self.events.push(Event::LaserHit {
                        cell: position,
                        mask,
                    });
                }
            }
        }

        for ant in &self.ants {
            let start = self
                .turn_start
                .iter()
                .find(|(id, _)| *id == ant.id)
                .map(|(_, position)| *position);
            if let Some(from) = start.filter(|from| *from != ant.position) {
                self.events.push(Event::AntMoved {
                    ant: ant.id,
                    from,
                    to: ant.position,
                });
            }
        }

        self.remove_dead_ants();

        for ant in &mut self.ants {
            ant.moving = false;
        }

        std::mem::swap(&mut self.laser, &mut self.previous_laser);
        for (cell, mask) in self.previous_laser.iter() {
            if mask != self.laser.at(cell) {
                self.events.push(Event::LaserChanged { cell, mask });
            }
        }
        self.laser.reset();

        for tile in self.grid.values_mut() {
            tile.cleanup();
        }

        self.turn += 1;
        tracing::trace!(turn = self.turn, ants = self.ants.len(), "turn committed");
    }

    fn remove_dead_ants(&mut self) {
        let controlled = self.controlled_ant().map(|ant| (ant.id, ant.position));
        let mut survivors = Vec::with_capacity(self.ants.len());

        for ant in std::mem::take(&mut self.ants) {
            match ant.hazard() {
                None => survivors.push(ant),
                Some(hazard) => self.bury(&ant, hazard),
            }
        }
        self.ants = survivors;

        self.controlled = match controlled {
            Some((id, position)) => match self.ants.iter().position(|ant| ant.id == id) {
                Some(index) => Some(index),
                None => {
                    let next = self.nearest_ant(position, None);
                    let to = next.and_then(|index| self.ants.get(index)).map(Ant::id);
                    tracing::debug!(from = id.get(), ?to, "controlled ant died");
                    self.events.push(Event::ControlTransferred { from: Some(id), to });
                    next
                }
            },
            None => None,
        };
    }

    fn bury(&mut self, ant: &Ant, hazard: Hazard) {
        let cell = ant.position;
        match hazard {
            Hazard::Spike => {
                if let Some(stack) = self.grid.stack_mut(cell) {
                    for tile in stack.iter_mut() {
                        if let Tile::Spike(spike) = tile {
                            spike.jammed = true;
                        }
                    }
                }
            }
            Hazard::Laser => {
                self.grid
                    .push(cell.x(), cell.y(), Tile::AntRemains(AntRemains::default()));
            }
        }

        tracing::debug!(ant = ant.id.get(), ?hazard, x = cell.x(), y = cell.y(), "ant killed");
        self.events.push(Event::AntKilled {
            ant: ant.id,
            cell,
            hazard,
        });
    }

    /// Drains events recorded since the last report.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
