//! Tile variants and the capability set they implement.
//!
//! Every cell of a stage holds an ordered stack of [`Tile`] values. Shared
//! behaviour is expressed as capabilities rather than a type hierarchy:
//!
//! * **Passable**: [`Tile::passability`] contributes a [`Passability`] policy
//!   to the cell's bottom-to-top fold.
//! * **Connected**: [`Tile::wire`] exposes the wiring template, connection
//!   mask, owning network and input flag.
//! * **Input / Output**: [`Tile::is_input`] tiles drive their network,
//!   [`Tile::is_output`] tiles react to it.
//! * **LaserHandler**: [`Tile::handle_laser`].
//! * **ItemHandler**: [`Tile::accepts_item`], [`Tile::give_item`] and
//!   [`Tile::take_item`].
//!
//! Per-turn behaviour that reaches beyond a single tile (buttons sensing ants,
//! belts moving things) lives on the stage, which matches over the variant.

use std::rc::Rc;

use ant_factory_core::{
    ConnectionMask, Direction, ItemKind, LaserMask, NetworkId, Orientation, Passability, Position,
};

use crate::{items::Recipe, laser::LaserResponse, network::Networks};

/// Shared wiring template; tiles join a network only with tiles that share
/// the same template instance.
///
/// The part labels are purely presentational: four "off" labels followed by
/// four "on" labels, one per side in connection-bit order.
#[derive(Debug, PartialEq, Eq)]
pub struct WireTemplate {
    color: String,
    parts: [String; 8],
}

impl WireTemplate {
    /// Creates a template with explicit part labels.
    #[must_use]
    pub fn new(color: impl Into<String>, parts: [String; 8]) -> Self {
        Self {
            color: color.into(),
            parts,
        }
    }

    /// Creates the conventional `cable_<color>_<side>[_on]` template.
    #[must_use]
    pub fn cable(color: &str) -> Self {
        let parts = std::array::from_fn(|slot| {
            let side = SIDE_NAMES[slot % 4];
            if slot < 4 {
                format!("cable_{color}_{side}")
            } else {
                format!("cable_{color}_{side}_on")
            }
        });
        Self::new(color, parts)
    }

    /// Colour name the template was registered under.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// All eight part labels.
    #[must_use]
    pub fn parts(&self) -> &[String; 8] {
        &self.parts
    }

    /// Part label drawn for `side` in the given activation state.
    #[must_use]
    pub fn part(&self, side: Direction, active: bool) -> &str {
        let offset = if active { 4 } else { 0 };
        &self.parts[side.index() + offset]
    }
}

const SIDE_NAMES: [&str; 4] = ["up", "right", "down", "left"];

/// Wiring state carried by every connected tile.
#[derive(Clone, Debug)]
pub struct Wire {
    template: Rc<WireTemplate>,
    connections: ConnectionMask,
    network: Option<NetworkId>,
    active: bool,
}

impl Wire {
    /// Creates an unassigned wire using `template`.
    #[must_use]
    pub fn new(template: Rc<WireTemplate>, connections: ConnectionMask) -> Self {
        Self {
            template,
            connections,
            network: None,
            active: false,
        }
    }

    /// Template shared with the rest of the wiring colour.
    #[must_use]
    pub fn template(&self) -> &Rc<WireTemplate> {
        &self.template
    }

    /// Sides participating in wiring adjacency.
    #[must_use]
    pub const fn connections(&self) -> ConnectionMask {
        self.connections
    }

    /// Network this tile was grouped into, if any.
    #[must_use]
    pub const fn network(&self) -> Option<NetworkId> {
        self.network
    }

    /// Source flag; only meaningful for input tiles.
    #[must_use]
    pub const fn active(&self) -> bool {
        self.active
    }

    /// Reports whether both wires were cut from the same template instance.
    #[must_use]
    pub fn same_template(&self, other: &Wire) -> bool {
        Rc::ptr_eq(&self.template, &other.template)
    }

    pub(crate) fn set_network(&mut self, network: NetworkId) {
        self.network = Some(network);
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

/// Diagonal a mirror is mounted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MirrorDiagonal {
    /// `\`: right-travelling beams turn down.
    Falling,
    /// `/`: right-travelling beams turn up.
    Rising,
}

impl MirrorDiagonal {
    /// The other diagonal.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Falling => Self::Rising,
            Self::Rising => Self::Falling,
        }
    }

    /// Offset into the bounce table.
    #[must_use]
    pub const fn bounce_offset(self) -> usize {
        match self {
            Self::Falling => 0,
            Self::Rising => 4,
        }
    }
}

/// Sign post showing a message to the controlled ant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Help {
    pub(crate) message: String,
}

impl Help {
    /// Message displayed while the controlled ant stands on the sign.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Ant-operated toggle.
#[derive(Clone, Debug)]
pub struct Switch {
    pub(crate) wire: Wire,
    pub(crate) state: bool,
    pub(crate) occupied: bool,
}

impl Switch {
    /// Current toggle state.
    #[must_use]
    pub const fn state(&self) -> bool {
        self.state
    }

    pub(crate) fn sense(&mut self, occupied: bool) {
        if occupied && !self.occupied {
            self.state = !self.state;
        }
        self.occupied = occupied;
        self.wire.set_active(self.state);
    }
}

/// Floor spike; jammed spikes are harmless forever.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Spike {
    pub(crate) jammed: bool,
}

impl Spike {
    /// Reports whether a corpse jammed the spike.
    #[must_use]
    pub const fn is_jammed(&self) -> bool {
        self.jammed
    }
}

/// Beam-deflecting mirror; network activity rotates it onto the other diagonal.
#[derive(Clone, Debug)]
pub struct Mirror {
    pub(crate) wire: Wire,
    pub(crate) diagonal: MirrorDiagonal,
    pub(crate) hits: LaserMask,
}

impl Mirror {
    /// Diagonal the mirror was mounted on.
    #[must_use]
    pub const fn diagonal(&self) -> MirrorDiagonal {
        self.diagonal
    }

    /// Diagonal in effect given the current network state.
    #[must_use]
    pub fn effective_diagonal(&self, networks: &Networks) -> MirrorDiagonal {
        if networks.is_active(self.wire.network()) {
            self.diagonal.flipped()
        } else {
            self.diagonal
        }
    }

    /// Beams that struck the mirror this turn.
    #[must_use]
    pub const fn hits(&self) -> LaserMask {
        self.hits
    }
}

/// Laser emitter firing while its network is active.
#[derive(Clone, Debug)]
pub struct LaserMachine {
    pub(crate) wire: Wire,
    pub(crate) orientation: Orientation,
}

impl LaserMachine {
    /// Direction the beam leaves the machine.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }
}

/// Opaque remains of a lasered ant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AntRemains {
    pub(crate) hits: LaserMask,
}

impl AntRemains {
    /// Beams absorbed this turn.
    #[must_use]
    pub const fn hits(&self) -> LaserMask {
        self.hits
    }
}

/// Conveyor belt carrying one item and any standing ant.
#[derive(Clone, Debug)]
pub struct Belt {
    pub(crate) wire: Wire,
    pub(crate) direction: Direction,
    pub(crate) item: Option<ItemKind>,
    pub(crate) incoming: Option<ItemKind>,
}

impl Belt {
    /// Direction the belt runs.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Item resting on the belt.
    #[must_use]
    pub const fn item(&self) -> Option<ItemKind> {
        self.item
    }
}

/// Side a crane arm currently points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CraneArm {
    /// Arm over the pickup side.
    Pickup,
    /// Arm over the drop side.
    Drop,
}

/// Crane swinging items from its pickup side to its drop side.
#[derive(Clone, Debug)]
pub struct Crane {
    pub(crate) wire: Wire,
    pub(crate) pickup: Direction,
    pub(crate) drop: Direction,
    pub(crate) arm: CraneArm,
    pub(crate) held: Option<ItemKind>,
    pub(crate) rotating: bool,
}

impl Crane {
    /// Side the crane picks items from.
    #[must_use]
    pub const fn pickup(&self) -> Direction {
        self.pickup
    }

    /// Side the crane drops items onto.
    #[must_use]
    pub const fn drop_side(&self) -> Direction {
        self.drop
    }

    /// Side the arm points at.
    #[must_use]
    pub const fn arm(&self) -> CraneArm {
        self.arm
    }

    /// Item hanging from the arm.
    #[must_use]
    pub const fn held(&self) -> Option<ItemKind> {
        self.held
    }
}

/// Assembly machine combining ingredients into a product.
#[derive(Clone, Debug)]
pub struct Machine {
    pub(crate) recipe: &'static Recipe,
    pub(crate) stock: Vec<ItemKind>,
    pub(crate) incoming: Option<ItemKind>,
    pub(crate) product: Option<ItemKind>,
    pub(crate) output: Direction,
}

impl Machine {
    /// Recipe the machine assembles.
    #[must_use]
    pub const fn recipe(&self) -> &'static Recipe {
        self.recipe
    }

    /// Ingredients collected so far.
    #[must_use]
    pub fn stock(&self) -> &[ItemKind] {
        &self.stock
    }

    /// Finished product waiting to be ejected.
    #[must_use]
    pub const fn product(&self) -> Option<ItemKind> {
        self.product
    }

    /// Side finished products are ejected to.
    #[must_use]
    pub const fn output(&self) -> Direction {
        self.output
    }
}

/// Boolean operation evaluated by a [`Gate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateOp {
    /// Every input active.
    And,
    /// Any input active.
    Or,
    /// No input active.
    Not,
}

impl GateOp {
    /// Folds the input levels into the gate output.
    #[must_use]
    pub fn evaluate(self, inputs: &[bool]) -> bool {
        match self {
            Self::And => !inputs.is_empty() && inputs.iter().all(|level| *level),
            Self::Or => inputs.iter().any(|level| *level),
            Self::Not => !inputs.iter().any(|level| *level),
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }
}

/// Logic gate driving its network from neighbouring networks.
#[derive(Clone, Debug)]
pub struct Gate {
    pub(crate) wire: Wire,
    pub(crate) op: GateOp,
    pub(crate) inputs: ConnectionMask,
}

impl Gate {
    /// Operation evaluated each turn.
    #[must_use]
    pub const fn op(&self) -> GateOp {
        self.op
    }

    /// Sides read as inputs.
    #[must_use]
    pub const fn inputs(&self) -> ConnectionMask {
        self.inputs
    }
}

/// Set/reset latch; the set side wins when both are active.
#[derive(Clone, Debug)]
pub struct RsLatch {
    pub(crate) wire: Wire,
    pub(crate) set: Direction,
    pub(crate) reset: Direction,
    pub(crate) state: bool,
}

impl RsLatch {
    /// Stored state.
    #[must_use]
    pub const fn state(&self) -> bool {
        self.state
    }

    pub(crate) fn latch(&mut self, set: bool, reset: bool) {
        if set {
            self.state = true;
        } else if reset {
            self.state = false;
        }
        self.wire.set_active(self.state);
    }
}

/// Periodic signal source, active for the first half of each period.
#[derive(Clone, Debug)]
pub struct Clock {
    pub(crate) wire: Wire,
    pub(crate) period: u32,
    pub(crate) phase: u32,
}

impl Clock {
    /// Turns per full cycle.
    #[must_use]
    pub const fn period(&self) -> u32 {
        self.period
    }

    /// Position inside the current cycle.
    #[must_use]
    pub const fn phase(&self) -> u32 {
        self.phase
    }

    pub(crate) fn tick(&mut self) {
        let period = self.period.max(1);
        self.wire
            .set_active(u64::from(self.phase) * 2 < u64::from(period));
        self.phase = (self.phase + 1) % period;
    }
}

/// Passage into another level, opened or closed when levels are switched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Passage {
    pub(crate) level: String,
    pub(crate) target: Option<Position>,
    pub(crate) open: bool,
}

impl Passage {
    /// Level the passage leads to.
    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    /// Arrival cell inside the target level, if pinned.
    #[must_use]
    pub const fn target(&self) -> Option<Position> {
        self.target
    }

    /// Openness resolved at the last level transition.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }
}

/// Polymorphic unit occupying one slot of a cell's stack.
#[derive(Clone, Debug)]
pub enum Tile {
    /// Solid wall.
    Wall,
    /// Solid ledge at the border of the walkable area.
    Edge,
    /// Walkable floor.
    Ground,
    /// Sign post.
    Help(Help),
    /// Plain wiring.
    Cable(Wire),
    /// Pressure plate pressed by any standing ant.
    Button(Wire),
    /// Ant-operated toggle.
    Switch(Switch),
    /// Door open while its network is active.
    Door(Wire),
    /// Floor spike.
    Spike(Spike),
    /// Beam-deflecting mirror.
    Mirror(Mirror),
    /// Laser emitter.
    LaserMachine(LaserMachine),
    /// Remains of a lasered ant.
    AntRemains(AntRemains),
    /// Conveyor belt.
    Belt(Belt),
    /// Item crane.
    Crane(Crane),
    /// Assembly machine.
    Machine(Machine),
    /// Logic gate.
    Gate(Gate),
    /// Set/reset latch.
    RsLatch(RsLatch),
    /// Periodic signal source.
    Clock(Clock),
    /// Cross-level passage.
    Passage(Passage),
}

impl Tile {
    /// Variant name as used by the tile factory.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Wall => "wall",
            Self::Edge => "edge",
            Self::Ground => "ground",
            Self::Help(_) => "help",
            Self::Cable(_) => "cable",
            Self::Button(_) => "button",
            Self::Switch(_) => "switch",
            Self::Door(_) => "door",
            Self::Spike(_) => "spike",
            Self::Mirror(_) => "mirror",
            Self::LaserMachine(_) => "laser",
            Self::AntRemains(_) => "ant_remains",
            Self::Belt(_) => "belt",
            Self::Crane(_) => "crane",
            Self::Machine(_) => "machine",
            Self::Gate(gate) => gate.op.name(),
            Self::RsLatch(_) => "rs_latch",
            Self::Clock(_) => "clock",
            Self::Passage(_) => "passage",
        }
    }

    /// Passability policy this tile contributes to its cell.
    #[must_use]
    pub fn passability(&self, networks: &Networks) -> Passability {
        match self {
            Self::Ground | Self::Spike(_) | Self::Belt(_) => Passability::Open,
            Self::Wall
            | Self::Edge
            | Self::Mirror(_)
            | Self::LaserMachine(_)
            | Self::Crane(_)
            | Self::Machine(_)
            | Self::Gate(_)
            | Self::RsLatch(_)
            | Self::Clock(_) => Passability::Blocked,
            Self::Door(wire) => {
                if networks.is_active(wire.network()) {
                    Passability::Open
                } else {
                    Passability::Blocked
                }
            }
            Self::Passage(passage) => {
                if passage.open {
                    Passability::Open
                } else {
                    Passability::Blocked
                }
            }
            Self::Help(_)
            | Self::Cable(_)
            | Self::Button(_)
            | Self::Switch(_)
            | Self::AntRemains(_) => Passability::Ignore,
        }
    }

    /// Wiring state for connected tiles.
    #[must_use]
    pub fn wire(&self) -> Option<&Wire> {
        match self {
            Self::Cable(wire) | Self::Button(wire) | Self::Door(wire) => Some(wire),
            Self::Switch(switch) => Some(&switch.wire),
            Self::Mirror(mirror) => Some(&mirror.wire),
            Self::LaserMachine(machine) => Some(&machine.wire),
            Self::Belt(belt) => Some(&belt.wire),
            Self::Crane(crane) => Some(&crane.wire),
            Self::Gate(gate) => Some(&gate.wire),
            Self::RsLatch(latch) => Some(&latch.wire),
            Self::Clock(clock) => Some(&clock.wire),
            Self::Wall
            | Self::Edge
            | Self::Ground
            | Self::Help(_)
            | Self::Spike(_)
            | Self::AntRemains(_)
            | Self::Machine(_)
            | Self::Passage(_) => None,
        }
    }

    /// Mutable wiring state for connected tiles.
    #[must_use]
    pub fn wire_mut(&mut self) -> Option<&mut Wire> {
        match self {
            Self::Cable(wire) | Self::Button(wire) | Self::Door(wire) => Some(wire),
            Self::Switch(switch) => Some(&mut switch.wire),
            Self::Mirror(mirror) => Some(&mut mirror.wire),
            Self::LaserMachine(machine) => Some(&mut machine.wire),
            Self::Belt(belt) => Some(&mut belt.wire),
            Self::Crane(crane) => Some(&mut crane.wire),
            Self::Gate(gate) => Some(&mut gate.wire),
            Self::RsLatch(latch) => Some(&mut latch.wire),
            Self::Clock(clock) => Some(&mut clock.wire),
            Self::Wall
            | Self::Edge
            | Self::Ground
            | Self::Help(_)
            | Self::Spike(_)
            | Self::AntRemains(_)
            | Self::Machine(_)
            | Self::Passage(_) => None,
        }
    }

    /// Reports whether the tile is a logic source for its network.
    #[must_use]
    pub const fn is_input(&self) -> bool {
        matches!(
            self,
            Self::Button(_) | Self::Switch(_) | Self::Gate(_) | Self::RsLatch(_) | Self::Clock(_)
        )
    }

    /// Reports whether the tile reacts to its network's activation.
    #[must_use]
    pub const fn is_output(&self) -> bool {
        matches!(
            self,
            Self::Door(_) | Self::Mirror(_) | Self::LaserMachine(_) | Self::Belt(_) | Self::Crane(_)
        )
    }

    /// Reports whether the owning network is active; `false` when unwired.
    #[must_use]
    pub fn network_active(&self, networks: &Networks) -> bool {
        self.wire()
            .map_or(false, |wire| networks.is_active(wire.network()))
    }

    /// Reports whether standing on this tile kills an ant.
    #[must_use]
    pub const fn is_armed_spike(&self) -> bool {
        matches!(self, Self::Spike(Spike { jammed: false }))
    }

    /// Reacts to a beam entering the cell travelling along `incoming`.
    pub fn handle_laser(&mut self, incoming: Orientation, networks: &Networks) -> LaserResponse {
        match self {
            Self::Mirror(mirror) => {
                mirror.hits = mirror.hits.with(incoming);
                let offset = mirror.effective_diagonal(networks).bounce_offset();
                LaserResponse::redirect(crate::laser::bounce(incoming, offset))
            }
            Self::AntRemains(remains) => {
                remains.hits = remains.hits.with(incoming);
                LaserResponse::STOP
            }
            Self::LaserMachine(_) => LaserResponse::STOP,
            _ => LaserResponse::pass(incoming),
        }
    }

    /// Beam decoration recorded this turn, for tiles that keep any.
    #[must_use]
    pub const fn laser_hits(&self) -> Option<LaserMask> {
        match self {
            Self::Mirror(mirror) => Some(mirror.hits),
            Self::AntRemains(remains) => Some(remains.hits),
            _ => None,
        }
    }

    /// Reports whether the tile takes `item` travelling by `(dx, dy)`.
    #[must_use]
    pub fn accepts_item(&self, item: ItemKind, dx: i32, dy: i32) -> bool {
        match self {
            Self::Belt(belt) => {
                let against = Direction::from_delta(-dx, -dy) == Some(belt.direction);
                belt.item.is_none() && belt.incoming.is_none() && !against
            }
            Self::Machine(machine) => {
                machine.incoming.is_none()
                    && machine.product.is_none()
                    && machine.recipe.needs(&machine.stock, item)
            }
            _ => false,
        }
    }

    /// Hands `item` to the tile; it settles during cleanup.
    ///
    /// Callers check [`Tile::accepts_item`] first; refused items are dropped.
    pub fn give_item(&mut self, item: ItemKind, dx: i32, dy: i32) {
        if !self.accepts_item(item, dx, dy) {
            return;
        }

        match self {
            Self::Belt(belt) => belt.incoming = Some(item),
            Self::Machine(machine) => machine.incoming = Some(item),
            _ => {}
        }
    }

    /// Removes an item for a taker reaching in by `(dx, dy)`.
    pub fn take_item(&mut self, _dx: i32, _dy: i32) -> Option<ItemKind> {
        match self {
            Self::Belt(belt) => belt.item.take(),
            Self::Machine(machine) => machine.product.take(),
            _ => None,
        }
    }

    /// Commits the tile's transient state at the end of a turn.
    pub fn cleanup(&mut self) {
        match self {
            Self::Belt(belt) => {
                if let Some(item) = belt.incoming.take() {
                    belt.item = Some(item);
                }
            }
            Self::Machine(machine) => {
                if let Some(item) = machine.incoming.take() {
                    machine.stock.push(item);
                }
            }
            Self::Crane(crane) => {
                if crane.rotating {
                    crane.arm = match crane.arm {
                        CraneArm::Pickup => CraneArm::Drop,
                        CraneArm::Drop => CraneArm::Pickup,
                    };
                    crane.rotating = false;
                }
            }
            Self::Mirror(mirror) => mirror.hits = LaserMask::EMPTY,
            Self::AntRemains(remains) => remains.hits = LaserMask::EMPTY,
            _ => {}
        }
    }

    /// Texture names drawn for this tile, bottom first.
    #[must_use]
    pub fn textures(&self, networks: &Networks) -> Vec<String> {
        let powered = self.network_active(networks);
        let base = match self {
            Self::Wall | Self::Edge | Self::Ground | Self::Help(_) | Self::AntRemains(_) => {
                self.name().to_owned()
            }
            Self::Cable(wire) => on_off(&format!("cable_{}", wire.template().color()), powered),
            Self::Button(wire) => {
                if wire.active() {
                    "button_down".to_owned()
                } else {
                    "button_up".to_owned()
                }
            }
            Self::Switch(switch) => on_off("switch", switch.state),
            Self::Door(_) => {
                if powered {
                    "door_open".to_owned()
                } else {
                    "door_closed".to_owned()
                }
            }
            Self::Spike(spike) => {
                if spike.jammed {
                    "spike_jam".to_owned()
                } else {
                    "spike".to_owned()
                }
            }
            Self::Mirror(mirror) => match mirror.effective_diagonal(networks) {
                MirrorDiagonal::Falling => "mirror_falling".to_owned(),
                MirrorDiagonal::Rising => "mirror_rising".to_owned(),
            },
            Self::LaserMachine(machine) => {
                on_off(&format!("laser_{}", orientation_name(machine.orientation)), powered)
            }
            Self::Belt(belt) => format!("belt_{}", SIDE_NAMES[belt.direction.index()]),
            Self::Crane(crane) => match crane.arm {
                CraneArm::Pickup => format!("crane_{}", SIDE_NAMES[crane.pickup.index()]),
                CraneArm::Drop => format!("crane_{}", SIDE_NAMES[crane.drop.index()]),
            },
            Self::Machine(machine) => format!("machine_{}", machine.recipe.product().name()),
            Self::Gate(gate) => on_off(&format!("gate_{}", gate.op.name()), gate.wire.active()),
            Self::RsLatch(latch) => on_off("rs_latch", latch.state),
            Self::Clock(clock) => on_off("clock", clock.wire.active()),
            Self::Passage(passage) => {
                if passage.open {
                    "passage_open".to_owned()
                } else {
                    "passage_closed".to_owned()
                }
            }
        };

        let mut textures = Vec::new();
        if let Some(wire) = self.wire() {
            for side in wire.connections().directions() {
                textures.push(wire.template().part(side, powered).to_owned());
            }
        }

        if matches!(self, Self::Cable(_)) {
            textures.insert(0, base);
        } else {
            textures.push(base);
        }

        let carried = match self {
            Self::Belt(belt) => belt.item,
            Self::Crane(crane) => crane.held,
            Self::Machine(machine) => machine.product,
            _ => None,
        };
        if let Some(item) = carried {
            textures.push(format!("item_{}", item.name()));
        }

        textures
    }
}

fn on_off(name: &str, on: bool) -> String {
    if on {
        format!("{name}_on")
    } else {
        name.to_owned()
    }
}

const fn orientation_name(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Right => "right",
        Orientation::Left => "left",
        Orientation::Down => "down",
        Orientation::Up => "up",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blue() -> Rc<WireTemplate> {
        Rc::new(WireTemplate::cable("blue"))
    }

    #[test]
    fn cable_template_labels_every_side() {
        let template = WireTemplate::cable("red");
        assert_eq!(template.part(Direction::Up, false), "cable_red_up");
        assert_eq!(template.part(Direction::Left, true), "cable_red_left_on");
    }

    #[test]
    fn template_identity_is_by_instance() {
        let shared = blue();
        let first = Wire::new(Rc::clone(&shared), ConnectionMask::new(0b0010));
        let second = Wire::new(Rc::clone(&shared), ConnectionMask::new(0b1000));
        let lookalike = Wire::new(blue(), ConnectionMask::new(0b1000));

        assert!(first.same_template(&second));
        assert!(!first.same_template(&lookalike));
    }

    #[test]
    fn door_follows_network_activation() {
        let networks = Networks::default();
        let door = Tile::Door(Wire::new(blue(), ConnectionMask::NONE));

        assert_eq!(door.passability(&networks), Passability::Blocked);
        assert!(door.is_output());
        assert!(!door.is_input());
    }

    #[test]
    fn clock_is_active_for_first_half_of_period() {
        let mut clock = Clock {
            wire: Wire::new(blue(), ConnectionMask::NONE),
            period: 4,
            phase: 0,
        };

        let mut levels = Vec::new();
        for _ in 0..5 {
            clock.tick();
            levels.push(clock.wire.active());
        }

        assert_eq!(levels, vec![true, true, false, false, true]);
    }

    #[test]
    fn switch_toggles_on_arrival_only() {
        let mut switch = Switch {
            wire: Wire::new(blue(), ConnectionMask::NONE),
            state: false,
            occupied: false,
        };

        switch.sense(true);
        assert!(switch.state());
        switch.sense(true);
        assert!(switch.state(), "standing still must not toggle again");
        switch.sense(false);
        switch.sense(true);
        assert!(!switch.state());
    }

    #[test]
    fn rs_latch_prefers_set() {
        let mut latch = RsLatch {
            wire: Wire::new(blue(), ConnectionMask::NONE),
            set: Direction::Left,
            reset: Direction::Right,
            state: false,
        };

        latch.latch(true, true);
        assert!(latch.state());
        latch.latch(false, false);
        assert!(latch.state(), "latch must hold its state");
        latch.latch(false, true);
        assert!(!latch.state());
    }

    #[test]
    fn gates_fold_inputs() {
        assert!(GateOp::And.evaluate(&[true, true]));
        assert!(!GateOp::And.evaluate(&[true, false]));
        assert!(!GateOp::And.evaluate(&[]));
        assert!(GateOp::Or.evaluate(&[false, true]));
        assert!(GateOp::Not.evaluate(&[false, false]));
        assert!(!GateOp::Not.evaluate(&[true]));
    }

    #[test]
    fn belt_refuses_items_running_against_it() {
        let belt = Tile::Belt(Belt {
            wire: Wire::new(blue(), ConnectionMask::NONE),
            direction: Direction::Right,
            item: None,
            incoming: None,
        });

        assert!(belt.accepts_item(ItemKind::Gear, 1, 0));
        assert!(belt.accepts_item(ItemKind::Gear, 0, 1));
        assert!(!belt.accepts_item(ItemKind::Gear, -1, 0));
    }

    #[test]
    fn given_items_settle_during_cleanup() {
        let mut belt = Tile::Belt(Belt {
            wire: Wire::new(blue(), ConnectionMask::NONE),
            direction: Direction::Down,
            item: None,
            incoming: None,
        });

        belt.give_item(ItemKind::Lens, 0, 1);
        assert!(!belt.accepts_item(ItemKind::Gear, 0, 1));
        assert_eq!(belt.take_item(0, 1), None, "in-flight items cannot be taken");

        belt.cleanup();
        assert_eq!(belt.take_item(0, 1), Some(ItemKind::Lens));
    }

    #[test]
    fn cable_base_texture_sits_under_its_parts() {
        let networks = Networks::default();
        let cable = Tile::Cable(Wire::new(blue(), ConnectionMask::new(0b0101)));

        assert_eq!(
            cable.textures(&networks),
            vec!["cable_blue", "cable_blue_up", "cable_blue_down"]
        );
    }
}
