//! Beam tracing over a tile grid.
//!
//! A beam marches one cell at a time away from its emitter. Every tile in a
//! visited cell handles the beam; the cell's mask gains the beam orientation
//! only when all of them agree to let it through, and the first tile that
//! redirects the beam decides where it heads next. Beams that run off the
//! grid or exhaust [`MAX_LASER_STEPS`] are silently truncated.

use ant_factory_core::{Orientation, Position};

use crate::{
    grid::{Grid, LaserGrid},
    network::Networks,
    tile::Tile,
};

/// Upper bound on cells visited by a single beam.
pub const MAX_LASER_STEPS: usize = 100;

/// Outgoing orientation codes indexed by `incoming + offset`, where the
/// offset is 0 for `\` mirrors and 4 for `/` mirrors.
pub const MIRROR_BOUNCE: [usize; 8] = [2, 3, 0, 1, 3, 2, 1, 0];

/// How a tile reacted to an incoming beam.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LaserResponse {
    outgoing: Option<Orientation>,
    deposit: bool,
}

impl LaserResponse {
    /// Absorbs the beam without marking the cell.
    pub const STOP: LaserResponse = LaserResponse {
        outgoing: None,
        deposit: false,
    };

    /// Lets the beam continue unchanged and marks the cell.
    #[must_use]
    pub const fn pass(orientation: Orientation) -> Self {
        Self {
            outgoing: Some(orientation),
            deposit: true,
        }
    }

    /// Sends the beam off in a new orientation without marking the cell.
    #[must_use]
    pub const fn redirect(orientation: Orientation) -> Self {
        Self {
            outgoing: Some(orientation),
            deposit: false,
        }
    }

    /// Orientation the beam leaves with, `None` when absorbed.
    #[must_use]
    pub const fn outgoing(&self) -> Option<Orientation> {
        self.outgoing
    }

    /// Reports whether the cell should carry the incoming beam.
    #[must_use]
    pub const fn deposit(&self) -> bool {
        self.deposit
    }
}

/// Looks up the bounce table for a beam striking a mirror.
#[must_use]
pub fn bounce(incoming: Orientation, offset: usize) -> Orientation {
    MIRROR_BOUNCE
        .get(incoming.code() + offset)
        .and_then(|code| Orientation::from_code(*code))
        .unwrap_or(incoming)
}

/// Traces a beam leaving `origin` along `orientation` into `target`.
pub fn send_laser(
    grid: &mut Grid<Tile>,
    networks: &Networks,
    target: &mut LaserGrid,
    origin: Position,
    orientation: Orientation,
) {
    let mut heading = orientation;
    let mut cursor = origin;

    for _ in 0..MAX_LASER_STEPS {
        let (dx, dy) = heading.delta();
        cursor = cursor.offset(dx, dy);
        let Some(stack) = grid.stack_mut(cursor) else {
            return;
        };

        let incoming = heading;
        let mut deposit = true;
        let mut stopped = false;
        let mut redirected = None;
        for tile in stack.iter_mut() {
            let response = tile.handle_laser(incoming, networks);
            deposit &= response.deposit();
            match response.outgoing() {
                None => stopped = true,
                Some(outgoing) if outgoing != incoming && redirected.is_none() => {
                    redirected = Some(outgoing);
                }
                Some(_) => {}
            }
        }

        if deposit {
            target.deposit(cursor, incoming);
        }
        if stopped {
            return;
        }
        if let Some(outgoing) = redirected {
            heading = outgoing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falling_mirror_turns_right_into_down() {
        assert_eq!(bounce(Orientation::Right, 0), Orientation::Down);
        assert_eq!(bounce(Orientation::Up, 0), Orientation::Left);
    }

    #[test]
    fn rising_mirror_turns_right_into_up() {
        assert_eq!(bounce(Orientation::Right, 4), Orientation::Up);
        assert_eq!(bounce(Orientation::Down, 4), Orientation::Left);
    }

    #[test]
    fn beam_stops_at_grid_edge() {
        let mut grid = Grid::new(3, 1);
        for x in 0..3 {
            grid.push(x, 0, Tile::Ground);
        }
        let networks = Networks::default();
        let mut target = LaserGrid::new(3, 1);

        send_laser(&mut grid, &networks, &mut target, Position::new(0, 0), Orientation::Right);

        assert!(target.get(0, 0).is_empty(), "the emitter cell is never marked");
        assert!(target.get(1, 0).contains(Orientation::Right));
        assert!(target.get(2, 0).contains(Orientation::Right));
    }
}
