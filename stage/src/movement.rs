//! Ant movement resolution and item hand-over.

use ant_factory_core::{AntId, Direction, Event, Position};

use crate::{ant::Ant, MovePolicy, Stage};

impl Stage {
    /// Attempts to move the ant `id` by `(dx, dy)`.
    ///
    /// The ant turns toward the dominant axis of the offset even when the
    /// move is then blocked. An occupied destination is resolved according
    /// to `policy`; a failed push leaves every ant where it was. Returns
    /// `true` when the ant changed cells.
    pub fn move_ant(&mut self, id: AntId, dx: i32, dy: i32, policy: MovePolicy) -> bool {
        match self.ants.iter().position(|ant| ant.id == id) {
            Some(index) => self.move_at(index, dx, dy, policy),
            None => false,
        }
    }

    pub(crate) fn move_at(&mut self, index: usize, dx: i32, dy: i32, policy: MovePolicy) -> bool {
        let Some(ant) = self.ants.get_mut(index) else {
            return false;
        };
        if !ant.can_move() {
            return false;
        }
        let Some(facing) = Direction::from_delta(dx, dy) else {
            return false;
        };
        ant.facing = facing;

        let from = ant.position;
        let to = from.offset(dx, dy);
        if !self.is_passable(to.x(), to.y()) {
            return false;
        }

        if let Some(occupant) = self.ant_index_at(to) {
            let destination = match policy {
                MovePolicy::Swap => {
                    // A flagged occupant is buried where it stands.
                    if self.ants.get(occupant).map_or(true, |other| other.hazard().is_some()) {
                        return false;
                    }
                    from
                }
                MovePolicy::Push => {
                    let beyond = to.offset(dx, dy);
                    let blocked = self.ant_index_at(beyond).is_some()
                        || !self.is_passable(beyond.x(), beyond.y())
                        || !self.ants.get(occupant).map_or(false, Ant::can_move);
                    if blocked {
                        return false;
                    }
                    beyond
                }
            };

            if let Some(other) = self.ants.get_mut(occupant) {
                other.position = destination;
                other.facing = match policy {
                    MovePolicy::Swap => facing.opposite(),
                    MovePolicy::Push => facing,
                };
                other.moving = true;
                other.waited = false;
            }
        }

        if let Some(ant) = self.ants.get_mut(index) {
            ant.position = to;
            ant.moving = true;
            ant.waited = false;
        }
        self.exchange_item(index, from);
        true
    }

    /// Hands the carried item to the new cell, or picks one up from it.
    fn exchange_item(&mut self, index: usize, from: Position) {
        let Some(ant) = self.ants.get_mut(index) else {
            return;
        };
        let position = ant.position;
        let (dx, dy) = ant.facing.delta();
        let Some(stack) = self.grid.stack_mut(position) else {
            return;
        };

        match ant.item {
            Some(item) => {
                if let Some(tile) = stack
                    .iter_mut()
                    .find(|tile| tile.accepts_item(item, dx, dy))
                {
                    tile.give_item(item, dx, dy);
                    ant.item = None;
                    self.events.push(Event::ItemMoved {
                        item,
                        from,
                        to: position,
                    });
                }
            }
            None => {
                ant.item = stack.iter_mut().find_map(|tile| tile.take_item(dx, dy));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ant_factory_core::{Direction, ItemKind, Position};

    use crate::{MovePolicy, Stage, Tile, TileArgs, TileFactory};

    fn corridor(width: u32) -> Stage {
        let mut stage = Stage::new(width, 1);
        for x in 0..width as i32 {
            stage.place(Position::new(x, 0), Tile::Ground).expect("inside stage");
        }
        stage
    }

    #[test]
    fn swap_exchanges_cells_and_flips_the_occupant() {
        let mut stage = corridor(2);
        let mover = stage.spawn_ant(Position::new(0, 0), true).expect("spawn");
        let occupant = stage.spawn_ant(Position::new(1, 0), false).expect("spawn");

        assert!(stage.move_ant(mover, 1, 0, MovePolicy::Swap));

        let ants = stage.ants();
        assert_eq!(ants[0].id(), mover);
        assert_eq!(ants[0].position(), Position::new(1, 0));
        assert_eq!(ants[1].id(), occupant);
        assert_eq!(ants[1].position(), Position::new(0, 0));
        assert_eq!(ants[1].facing(), Direction::Left);
        assert!(ants[1].is_moving(), "swapped occupant animates too");
    }

    #[test]
    fn push_advances_the_occupant_in_the_same_direction() {
        let mut stage = corridor(3);
        let mover = stage.spawn_ant(Position::new(0, 0), true).expect("spawn");
        let _ = stage.spawn_ant(Position::new(1, 0), false).expect("spawn");

        assert!(stage.move_ant(mover, 1, 0, MovePolicy::Push));

        let positions: Vec<_> = stage.ants().iter().map(|ant| ant.position()).collect();
        assert_eq!(positions, vec![Position::new(1, 0), Position::new(2, 0)]);
        assert_eq!(stage.ants()[1].facing(), Direction::Right);
    }

    #[test]
    fn an_ant_moves_at_most_once_per_turn() {
        let mut stage = corridor(3);
        let mover = stage.spawn_ant(Position::new(0, 0), true).expect("spawn");

        assert!(stage.move_ant(mover, 1, 0, MovePolicy::Swap));
        assert!(!stage.move_ant(mover, 1, 0, MovePolicy::Swap));
        assert_eq!(stage.ants()[0].position(), Position::new(1, 0));
    }

    #[test]
    fn ants_pick_up_and_drop_items_on_belts() {
        let factory = TileFactory::default();
        let mut stage = corridor(3);
        let loaded = factory
            .build(
                "belt",
                &TileArgs::default()
                    .with_direction(Direction::Down)
                    .with_item(ItemKind::Gear),
            )
            .expect("belt");
        let empty = factory
            .build("belt", &TileArgs::default().with_direction(Direction::Down))
            .expect("belt");
        stage.place(Position::new(1, 0), loaded).expect("inside stage");
        stage.place(Position::new(2, 0), empty).expect("inside stage");
        let ant = stage.spawn_ant(Position::new(0, 0), true).expect("spawn");

        assert!(stage.move_ant(ant, 1, 0, MovePolicy::Swap));
        assert_eq!(stage.ants()[0].item(), Some(ItemKind::Gear));

        stage.cleanup();
        assert!(stage.move_ant(ant, 1, 0, MovePolicy::Swap));
        assert_eq!(stage.ants()[0].item(), None);

        stage.cleanup();
        let delivered = stage.grid().get(2, 0).iter().find_map(|tile| match tile {
            Tile::Belt(belt) => belt.item(),
            _ => None,
        });
        assert_eq!(delivered, Some(ItemKind::Gear));
    }
}
