//! Mobile agents walking the stage.

use ant_factory_core::{AntId, Direction, Hazard, ItemKind, Position};

/// Policy applied when a move lands on an occupied cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovePolicy {
    /// The occupant takes the mover's old cell.
    Swap,
    /// The occupant is shoved one cell further, or the whole move fails.
    Push,
}

/// A single ant and its per-turn state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ant {
    pub(crate) id: AntId,
    pub(crate) position: Position,
    pub(crate) facing: Direction,
    pub(crate) moving: bool,
    pub(crate) spiked: bool,
    pub(crate) lasered: bool,
    pub(crate) waited: bool,
    pub(crate) item: Option<ItemKind>,
}

impl Ant {
    pub(crate) const fn new(id: AntId, position: Position) -> Self {
        Self {
            id,
            position,
            facing: Direction::Down,
            moving: false,
            spiked: false,
            lasered: false,
            waited: false,
            item: None,
        }
    }

    /// Stable identifier of the ant.
    #[must_use]
    pub const fn id(&self) -> AntId {
        self.id
    }

    /// Cell the ant occupies.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Direction the ant faces.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Set after a successful move; cleared during cleanup.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.moving
    }

    /// Marked for death by a spike.
    #[must_use]
    pub const fn is_spiked(&self) -> bool {
        self.spiked
    }

    /// Marked for death by a laser.
    #[must_use]
    pub const fn is_lasered(&self) -> bool {
        self.lasered
    }

    /// Item the ant carries.
    #[must_use]
    pub const fn item(&self) -> Option<ItemKind> {
        self.item
    }

    /// Reports whether the ant may still act this turn.
    #[must_use]
    pub const fn can_move(&self) -> bool {
        !self.moving && !self.spiked && !self.lasered
    }

    /// Hazard the ant was marked by, spikes first.
    #[must_use]
    pub const fn hazard(&self) -> Option<Hazard> {
        if self.spiked {
            Some(Hazard::Spike)
        } else if self.lasered {
            Some(Hazard::Laser)
        } else {
            None
        }
    }
}
