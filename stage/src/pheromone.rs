//! Per-cell movement instructions followed by non-controlled ants.

use ant_factory_core::Direction;

use crate::grid::Layer;

/// Instruction painted onto a cell.
///
/// An empty pheromone leaves ants idle. With `wait` set, an ant arriving on
/// the cell pauses for one turn before following `direction`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pheromone {
    direction: Option<Direction>,
    wait: bool,
}

impl Pheromone {
    /// Instruction with no direction and no pause.
    pub const NONE: Pheromone = Pheromone {
        direction: None,
        wait: false,
    };

    /// Creates a pheromone pointing in `direction`.
    #[must_use]
    pub const fn toward(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            wait: false,
        }
    }

    /// Returns the same instruction with the pause flag set.
    #[must_use]
    pub const fn with_wait(self) -> Self {
        Self {
            direction: self.direction,
            wait: true,
        }
    }

    /// Direction ants are sent, if any.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Reports whether ants pause here for a turn.
    #[must_use]
    pub const fn wait(&self) -> bool {
        self.wait
    }
}

/// Pheromone overlay sized like its stage.
pub type PheromoneGrid = Layer<Pheromone>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpainted_cells_hold_no_instruction() {
        let mut grid = PheromoneGrid::new(2, 2);
        grid.set(1, 0, Pheromone::toward(Direction::Down).with_wait());

        assert_eq!(grid.get(0, 0), Pheromone::NONE);
        assert_eq!(grid.get(9, 9), Pheromone::NONE);
        assert_eq!(grid.get(1, 0).direction(), Some(Direction::Down));
        assert!(grid.get(1, 0).wait());
    }
}
