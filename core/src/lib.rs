#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Ant Factory engine.
//!
//! This crate defines the value types and message surface that connect level
//! loaders, the authoritative stage, and presentation adapters. Loaders build
//! stages from resolved tile names and arguments, adapters submit one
//! [`Intent`] per turn, and the stage answers with [`Event`] values that
//! describe what the committed turn changed so renderers can animate it
//! without re-deriving simulation state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cardinal directions used for movement, facing and wiring sides.
///
/// The discriminant doubles as the bit index inside a [`ConnectionMask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing column indices.
    Right,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
}

impl Direction {
    /// All directions in connection-bit order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Bit index of the direction inside a connections mask.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    /// Resolves a direction from its connection-bit index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Up),
            1 => Some(Self::Right),
            2 => Some(Self::Down),
            3 => Some(Self::Left),
            _ => None,
        }
    }

    /// Direction pointing the other way, `(n + 2) mod 4`.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// Unit grid offset travelled when stepping in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// Direction of the dominant axis of `(dx, dy)`.
    ///
    /// Ties favour the horizontal axis. A zero offset has no direction.
    #[must_use]
    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        if dx == 0 && dy == 0 {
            return None;
        }

        if dx.unsigned_abs() >= dy.unsigned_abs() {
            if dx > 0 {
                Some(Self::Right)
            } else {
                Some(Self::Left)
            }
        } else if dy > 0 {
            Some(Self::Down)
        } else {
            Some(Self::Up)
        }
    }
}

/// Travel direction of a laser beam.
///
/// The numeric codes (`0=→, 1=←, 2=↓, 3=↑`) index the mirror bounce table
/// and select the bit recorded in a [`LaserMask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Beam travelling toward increasing column indices.
    Right,
    /// Beam travelling toward decreasing column indices.
    Left,
    /// Beam travelling toward increasing row indices.
    Down,
    /// Beam travelling toward decreasing row indices.
    Up,
}

impl Orientation {
    /// All orientations ordered by their numeric code.
    pub const ALL: [Orientation; 4] = [
        Orientation::Right,
        Orientation::Left,
        Orientation::Down,
        Orientation::Up,
    ];

    /// Numeric code of the orientation.
    #[must_use]
    pub const fn code(self) -> usize {
        match self {
            Self::Right => 0,
            Self::Left => 1,
            Self::Down => 2,
            Self::Up => 3,
        }
    }

    /// Resolves an orientation from its numeric code.
    #[must_use]
    pub const fn from_code(code: usize) -> Option<Self> {
        match code {
            0 => Some(Self::Right),
            1 => Some(Self::Left),
            2 => Some(Self::Down),
            3 => Some(Self::Up),
            _ => None,
        }
    }

    /// Grid offset travelled by the beam per step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        self.direction().delta()
    }

    /// Cardinal direction matching the beam's travel.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Right => Direction::Right,
            Self::Left => Direction::Left,
            Self::Down => Direction::Down,
            Self::Up => Direction::Up,
        }
    }
}

impl From<Direction> for Orientation {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Up,
            Direction::Right => Self::Right,
            Direction::Down => Self::Down,
            Direction::Left => Self::Left,
        }
    }
}

/// Signed grid position of a cell.
///
/// Positions may lie outside a stage; lookups with such positions yield
/// empty results instead of failing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new position from column and row coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Position displaced by the provided offset.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.wrapping_add(dx), self.y.wrapping_add(dy))
    }

    /// Neighbouring position one cell away in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Four-bit wiring mask; bit0 = up, bit1 = right, bit2 = down, bit3 = left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionMask(u8);

impl ConnectionMask {
    /// Mask without any connected side.
    pub const NONE: ConnectionMask = ConnectionMask(0);

    /// Creates a mask from raw bits, discarding anything above bit 3.
    #[must_use]
    pub const fn new(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// Builds a mask connecting every listed side.
    #[must_use]
    pub fn from_directions(directions: &[Direction]) -> Self {
        directions
            .iter()
            .fold(Self::NONE, |mask, direction| mask.with(*direction))
    }

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Reports whether the side facing `direction` participates in wiring.
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & (1 << direction.index()) != 0
    }

    /// Mask with the side facing `direction` added.
    #[must_use]
    pub const fn with(self, direction: Direction) -> Self {
        Self(self.0 | (1 << direction.index()))
    }

    /// Reports whether no side is connected.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the connected sides in bit order.
    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }
}

/// Set of beam orientations crossing a cell, one bit per [`Orientation`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaserMask(u8);

impl LaserMask {
    /// Cell without any beam.
    pub const EMPTY: LaserMask = LaserMask(0);

    /// Creates a mask from raw bits, discarding anything above bit 3.
    #[must_use]
    pub const fn new(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// Mask holding a single orientation.
    #[must_use]
    pub const fn single(orientation: Orientation) -> Self {
        Self(1 << orientation.code())
    }

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Mask with `orientation` added.
    #[must_use]
    pub const fn with(self, orientation: Orientation) -> Self {
        Self(self.0 | (1 << orientation.code()))
    }

    /// Reports whether `orientation` is present.
    #[must_use]
    pub const fn contains(self, orientation: Orientation) -> bool {
        self.0 & (1 << orientation.code()) != 0
    }

    /// Reports whether no beam crosses the cell.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Passability policy contributed by a single tile of a stack.
///
/// A cell's passability folds the policies bottom to top starting from
/// `false`; the topmost non-[`Passability::Ignore`] policy wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Passability {
    /// Keeps whatever the tiles below decided.
    Ignore,
    /// Forces the cell to be walkable.
    Open,
    /// Forces the cell to be blocked.
    Blocked,
}

impl Passability {
    /// Applies the policy on top of the running passability value.
    #[must_use]
    pub const fn fold(self, was_passable: bool) -> bool {
        match self {
            Self::Ignore => was_passable,
            Self::Open => true,
            Self::Blocked => false,
        }
    }
}

/// Stable identifier assigned to an ant by its stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AntId(u32);

impl AntId {
    /// Creates a new ant identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of a network inside its stage's network arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetworkId(u32);

impl NetworkId {
    /// Creates a new network identifier with the provided arena index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the arena index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Items carried by ants and moved around by belts, cranes and machines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    /// Length of pipe.
    Pipe,
    /// Coiled spring.
    Spring,
    /// Single gear.
    Gear,
    /// Assembled gearbox.
    Gearbox,
    /// Circuit board.
    Circuit,
    /// Optical lens.
    Lens,
    /// Assembled sensor.
    Sensor,
    /// Assembled processor.
    Processor,
    /// Assembled piston.
    Piston,
    /// Assembled motor.
    Motor,
    /// Ant head shell.
    AntHead,
    /// Ant abdomen shell.
    AntBack,
    /// Ant thorax shell.
    AntMiddle,
    /// Fully assembled ant.
    Ant,
}

impl ItemKind {
    /// Every item kind in declaration order.
    pub const ALL: [ItemKind; 14] = [
        ItemKind::Pipe,
        ItemKind::Spring,
        ItemKind::Gear,
        ItemKind::Gearbox,
        ItemKind::Circuit,
        ItemKind::Lens,
        ItemKind::Sensor,
        ItemKind::Processor,
        ItemKind::Piston,
        ItemKind::Motor,
        ItemKind::AntHead,
        ItemKind::AntBack,
        ItemKind::AntMiddle,
        ItemKind::Ant,
    ];

    /// Name used by level descriptions and texture lookups.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pipe => "pipe",
            Self::Spring => "spring",
            Self::Gear => "gear",
            Self::Gearbox => "gearbox",
            Self::Circuit => "circuit",
            Self::Lens => "lens",
            Self::Sensor => "sensor",
            Self::Processor => "processor",
            Self::Piston => "piston",
            Self::Motor => "motor",
            Self::AntHead => "ant_head",
            Self::AntBack => "ant_back",
            Self::AntMiddle => "ant_middle",
            Self::Ant => "ant",
        }
    }

    /// Resolves an item kind from its level-description name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// Hazard that killed an ant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hazard {
    /// The ant stood on an un-jammed spike.
    Spike,
    /// The ant stood in last turn's laser beam.
    Laser,
}

/// Externally injected mutation applied to the controlled ant each turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// The controlled ant stays put.
    #[default]
    Idle,
    /// The controlled ant attempts to move by the offset, swapping with any
    /// ant that occupies the destination.
    Move {
        /// Column offset of the attempted move.
        dx: i32,
        /// Row offset of the attempted move.
        dy: i32,
    },
}

impl Intent {
    /// Intent moving one cell in `direction`.
    #[must_use]
    pub const fn step(direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::Move { dx, dy }
    }
}

/// Changes committed by a turn, broadcast for renderers and adapters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// An ant ended the turn on a different cell.
    AntMoved {
        /// Ant that moved.
        ant: AntId,
        /// Cell occupied when the turn began.
        from: Position,
        /// Cell occupied when the turn was committed.
        to: Position,
    },
    /// An ant was removed by a hazard.
    AntKilled {
        /// Ant that died.
        ant: AntId,
        /// Cell the ant died on.
        cell: Position,
        /// Hazard responsible for the death.
        hazard: Hazard,
    },
    /// Control moved from one ant to another, or was lost.
    ControlTransferred {
        /// Previously controlled ant.
        from: Option<AntId>,
        /// Newly controlled ant, if any survived.
        to: Option<AntId>,
    },
    /// A network's activation flipped during recomputation.
    NetworkChanged {
        /// Network whose activation changed.
        network: NetworkId,
        /// Activation after recomputation.
        active: bool,
    },
    /// The committed beam state of a cell differs from the previous turn.
    LaserChanged {
        /// Cell whose beam mask changed.
        cell: Position,
        /// Beam mask committed for the cell.
        mask: LaserMask,
    },
    /// A mirror or other beam handler was struck this turn.
    LaserHit {
        /// Cell of the struck tile.
        cell: Position,
        /// Orientations of the incoming beams.
        mask: LaserMask,
    },
    /// An item was handed from one cell to another.
    ItemMoved {
        /// Item that moved.
        item: ItemKind,
        /// Cell the item left.
        from: Position,
        /// Cell that received the item.
        to: Position,
    },
}

/// Failures reported back to level loaders while constructing a stage.
///
/// None of these can surface once the turn engine is running.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No constructor is registered for the requested tile variant.
    #[error("unknown tile variant `{name}`")]
    UnknownVariant {
        /// Variant name requested by the loader.
        name: String,
    },
    /// The requested wire colour has no template.
    #[error("unknown wire color `{color}`")]
    UnknownColor {
        /// Colour requested by the loader.
        color: String,
    },
    /// A variant requires an argument the loader did not supply.
    #[error("tile variant `{variant}` requires argument `{argument}`")]
    MissingArgument {
        /// Variant being constructed.
        variant: &'static str,
        /// Name of the missing argument.
        argument: &'static str,
    },
    /// A supplied argument is outside the range the variant accepts.
    #[error("tile variant `{variant}` rejected argument `{argument}`: {reason}")]
    InvalidArgument {
        /// Variant being constructed.
        variant: &'static str,
        /// Name of the rejected argument.
        argument: &'static str,
        /// Human readable explanation.
        reason: &'static str,
    },
    /// A tile or ant was placed outside the stage bounds.
    #[error("position ({}, {}) lies outside the stage", .position.x(), .position.y())]
    OutOfBounds {
        /// Offending position.
        position: Position,
    },
    /// A network was requested from a tile that carries no wiring.
    #[error("tile {index} at ({}, {}) is not connected", .position.x(), .position.y())]
    NotConnected {
        /// Cell holding the addressed stack.
        position: Position,
        /// Index inside the stack.
        index: usize,
    },
}
