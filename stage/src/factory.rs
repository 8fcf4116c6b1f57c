//! Name-keyed tile construction for level loaders.

use std::{collections::BTreeMap, rc::Rc};

use ant_factory_core::{
    ConfigurationError, ConnectionMask, Direction, ItemKind, LaserMask, Orientation, Position,
};

use crate::{
    items::recipe_for,
    tile::{
        AntRemains, Belt, Clock, Crane, CraneArm, Gate, GateOp, Help, LaserMachine, Machine,
        Mirror, MirrorDiagonal, Passage, RsLatch, Spike, Switch, Tile, Wire, WireTemplate,
    },
};

/// Colour used when a loader does not name one.
pub const DEFAULT_COLOR: &str = "blue";

const BUILTIN_COLORS: [&str; 4] = ["blue", "red", "green", "yellow"];

/// Already-resolved arguments for a tile constructor.
///
/// Each variant reads the fields it understands and ignores the rest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileArgs {
    /// Wiring sides.
    pub connections: ConnectionMask,
    /// Wire colour; falls back to [`DEFAULT_COLOR`].
    pub color: Option<String>,
    /// Belt travel, crane pickup, machine output or latch set side.
    pub direction: Option<Direction>,
    /// Crane drop side or latch reset side.
    pub secondary: Option<Direction>,
    /// Sides a logic gate reads.
    pub inputs: ConnectionMask,
    /// Laser beam orientation.
    pub orientation: Option<Orientation>,
    /// Mirror mounting.
    pub diagonal: Option<MirrorDiagonal>,
    /// Initial clock phase.
    pub phase: u32,
    /// Clock period.
    pub period: Option<u32>,
    /// Spike starts jammed.
    pub jammed: bool,
    /// Item initially resting on a belt.
    pub item: Option<ItemKind>,
    /// Product assembled by a machine.
    pub product: Option<ItemKind>,
    /// Help message.
    pub text: Option<String>,
    /// Target level of a passage.
    pub level: Option<String>,
    /// Arrival cell of a passage.
    pub target: Option<Position>,
}

impl TileArgs {
    /// Sets the wiring sides from the raw four-bit mask.
    #[must_use]
    pub fn with_connections(mut self, bits: u8) -> Self {
        self.connections = ConnectionMask::new(bits);
        self
    }

    /// Sets the wire colour.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the primary direction.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Sets the secondary direction.
    #[must_use]
    pub fn with_secondary(mut self, direction: Direction) -> Self {
        self.secondary = Some(direction);
        self
    }

    /// Sets the gate input sides from the raw four-bit mask.
    #[must_use]
    pub fn with_inputs(mut self, bits: u8) -> Self {
        self.inputs = ConnectionMask::new(bits);
        self
    }

    /// Sets the beam orientation.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Sets the mirror diagonal.
    #[must_use]
    pub fn with_diagonal(mut self, diagonal: MirrorDiagonal) -> Self {
        self.diagonal = Some(diagonal);
        self
    }

    /// Sets the clock period and initial phase.
    #[must_use]
    pub fn with_period(mut self, period: u32, phase: u32) -> Self {
        self.period = Some(period);
        self.phase = phase;
        self
    }

    /// Marks a spike as jammed.
    #[must_use]
    pub fn with_jammed(mut self) -> Self {
        self.jammed = true;
        self
    }

    /// Sets the item initially carried.
    #[must_use]
    pub fn with_item(mut self, item: ItemKind) -> Self {
        self.item = Some(item);
        self
    }

    /// Sets the machine product.
    #[must_use]
    pub fn with_product(mut self, product: ItemKind) -> Self {
        self.product = Some(product);
        self
    }

    /// Sets the help message.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the passage destination.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>, target: Option<Position>) -> Self {
        self.level = Some(level.into());
        self.target = target;
        self
    }
}

type Constructor = fn(&TileArgs, &Rc<WireTemplate>) -> Result<Tile, ConfigurationError>;

/// Registry of tile constructors and shared wire templates.
///
/// Names may carry a colour suffix (`cable_red`), which selects the wire
/// template; every tile built with the same colour shares one template
/// instance and can therefore join the same network.
#[derive(Debug)]
pub struct TileFactory {
    palette: BTreeMap<String, Rc<WireTemplate>>,
    constructors: BTreeMap<&'static str, Constructor>,
}

impl Default for TileFactory {
    fn default() -> Self {
        let mut factory = Self {
            palette: BTreeMap::new(),
            constructors: BTreeMap::new(),
        };
        for color in BUILTIN_COLORS {
            let _ = factory.add_color(color);
        }

        let builtins: [(&'static str, Constructor); 21] = [
            ("wall", |_, _| Ok(Tile::Wall)),
            ("edge", |_, _| Ok(Tile::Edge)),
            ("ground", |_, _| Ok(Tile::Ground)),
            ("help", build_help),
            ("cable", |args, template| Ok(Tile::Cable(wire(args, template)))),
            ("button", |args, template| Ok(Tile::Button(wire(args, template)))),
            ("switch", build_switch),
            ("door", |args, template| Ok(Tile::Door(wire(args, template)))),
            ("spike", |args, _| Ok(Tile::Spike(Spike { jammed: args.jammed }))),
            ("mirror", build_mirror),
            ("laser", build_laser),
            ("ant_remains", |_, _| Ok(Tile::AntRemains(AntRemains::default()))),
            ("belt", build_belt),
            ("crane", build_crane),
            ("machine", build_machine),
            ("and", |args, template| build_gate(args, template, GateOp::And)),
            ("or", |args, template| build_gate(args, template, GateOp::Or)),
            ("not", |args, template| build_gate(args, template, GateOp::Not)),
            ("rs_latch", build_latch),
            ("clock", build_clock),
            ("passage", build_passage),
        ];
        factory.constructors.extend(builtins);
        factory
    }
}

impl TileFactory {
    /// Registers a wire colour, returning its shared template.
    ///
    /// Registering an existing colour returns the template already in use.
    pub fn add_color(&mut self, color: &str) -> Rc<WireTemplate> {
        Rc::clone(
            self.palette
                .entry(color.to_owned())
                .or_insert_with(|| Rc::new(WireTemplate::cable(color))),
        )
    }

    /// Shared template registered for `color`.
    #[must_use]
    pub fn template(&self, color: &str) -> Option<Rc<WireTemplate>> {
        self.palette.get(color).cloned()
    }

    /// Names of every registered variant.
    pub fn variants(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constructors.keys().copied()
    }

    /// Builds the tile registered under `name`.
    ///
    /// # Errors
    ///
    /// Fails when the variant or colour is unknown, or when the variant
    /// rejects the supplied arguments.
    pub fn build(&self, name: &str, args: &TileArgs) -> Result<Tile, ConfigurationError> {
        let (constructor, color) = match self.constructors.get(name) {
            Some(constructor) => (constructor, args.color.as_deref().unwrap_or(DEFAULT_COLOR)),
            None => name
                .rsplit_once('_')
                .and_then(|(variant, color)| {
                    self.constructors
                        .get(variant)
                        .map(|constructor| (constructor, color))
                })
                .ok_or_else(|| ConfigurationError::UnknownVariant {
                    name: name.to_owned(),
                })?,
        };

        let template = self
            .palette
            .get(color)
            .ok_or_else(|| ConfigurationError::UnknownColor {
                color: color.to_owned(),
            })?;
        constructor(args, template)
    }
}

fn wire(args: &TileArgs, template: &Rc<WireTemplate>) -> Wire {
    Wire::new(Rc::clone(template), args.connections)
}

fn build_help(args: &TileArgs, _: &Rc<WireTemplate>) -> Result<Tile, ConfigurationError> {
    let message = args.text.clone().ok_or(ConfigurationError::MissingArgument {
        variant: "help",
        argument: "text",
    })?;
    Ok(Tile::Help(Help { message }))
}

fn build_switch(args: &TileArgs, template: &Rc<WireTemplate>) -> Result<Tile, ConfigurationError> {
    Ok(Tile::Switch(Switch {
        wire: wire(args, template),
        state: false,
        occupied: false,
    }))
}

fn build_mirror(args: &TileArgs, template: &Rc<WireTemplate>) -> Result<Tile, ConfigurationError> {
    Ok(Tile::Mirror(Mirror {
        wire: wire(args, template),
        diagonal: args.diagonal.unwrap_or(MirrorDiagonal::Falling),
        hits: LaserMask::EMPTY,
    }))
}

fn build_laser(args: &TileArgs, template: &Rc<WireTemplate>) -> Result<Tile, ConfigurationError> {
    let orientation = args.orientation.ok_or(ConfigurationError::MissingArgument {
        variant: "laser",
        argument: "orientation",
    })?;
    Ok(Tile::LaserMachine(LaserMachine {
        wire: wire(args, template),
        orientation,
    }))
}

fn build_belt(args: &TileArgs, template: &Rc<WireTemplate>) -> Result<Tile, ConfigurationError> {
    let direction = args.direction.ok_or(ConfigurationError::MissingArgument {
        variant: "belt",
        argument: "direction",
    })?;
    Ok(Tile::Belt(Belt {
        wire: wire(args, template),
        direction,
        item: args.item,
        incoming: None,
    }))
}

fn build_crane(args: &TileArgs, template: &Rc<WireTemplate>) -> Result<Tile, ConfigurationError> {
    let pickup = args.direction.ok_or(ConfigurationError::MissingArgument {
        variant: "crane",
        argument: "direction",
    })?;
    let drop = args.secondary.unwrap_or_else(|| pickup.opposite());
    if drop == pickup {
        return Err(ConfigurationError::InvalidArgument {
            variant: "crane",
            argument: "secondary",
            reason: "drop side must differ from pickup side",
        });
    }
    Ok(Tile::Crane(Crane {
        wire: wire(args, template),
        pickup,
        drop,
        arm: CraneArm::Pickup,
        held: args.item,
        rotating: false,
    }))
}

fn build_machine(args: &TileArgs, _: &Rc<WireTemplate>) -> Result<Tile, ConfigurationError> {
    let product = args.product.ok_or(ConfigurationError::MissingArgument {
        variant: "machine",
        argument: "product",
    })?;
    let recipe = recipe_for(product).ok_or(ConfigurationError::InvalidArgument {
        variant: "machine",
        argument: "product",
        reason: "no recipe produces this item",
    })?;
    Ok(Tile::Machine(Machine {
        recipe,
        stock: Vec::new(),
        incoming: None,
        product: None,
        output: args.direction.unwrap_or(Direction::Down),
    }))
}

fn build_gate(
    args: &TileArgs,
    template: &Rc<WireTemplate>,
    op: GateOp,
) -> Result<Tile, ConfigurationError> {
    if args.inputs.is_empty() {
        return Err(ConfigurationError::MissingArgument {
            variant: "gate",
            argument: "inputs",
        });
    }
    Ok(Tile::Gate(Gate {
        wire: wire(args, template),
        op,
        inputs: args.inputs,
    }))
}

fn build_latch(args: &TileArgs, template: &Rc<WireTemplate>) -> Result<Tile, ConfigurationError> {
    let set = args.direction.ok_or(ConfigurationError::MissingArgument {
        variant: "rs_latch",
        argument: "direction",
    })?;
    Ok(Tile::RsLatch(RsLatch {
        wire: wire(args, template),
        set,
        reset: args.secondary.unwrap_or_else(|| set.opposite()),
        state: false,
    }))
}

fn build_clock(args: &TileArgs, template: &Rc<WireTemplate>) -> Result<Tile, ConfigurationError> {
    let period = args.period.ok_or(ConfigurationError::MissingArgument {
        variant: "clock",
        argument: "period",
    })?;
    if period == 0 {
        return Err(ConfigurationError::InvalidArgument {
            variant: "clock",
            argument: "period",
            reason: "period must be at least one turn",
        });
    }
    Ok(Tile::Clock(Clock {
        wire: wire(args, template),
        period,
        phase: args.phase % period,
    }))
}

fn build_passage(args: &TileArgs, _: &Rc<WireTemplate>) -> Result<Tile, ConfigurationError> {
    let level = args.level.clone().ok_or(ConfigurationError::MissingArgument {
        variant: "passage",
        argument: "level",
    })?;
    Ok(Tile::Passage(Passage {
        level,
        target: args.target,
        open: false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_suffix_selects_shared_template() {
        let factory = TileFactory::default();
        let args = TileArgs::default().with_connections(0b0010);

        let suffixed = factory.build("cable_red", &args).expect("red cable");
        let explicit = factory
            .build("door", &args.clone().with_color("red"))
            .expect("red door");
        let default = factory.build("cable", &args).expect("blue cable");

        let red = suffixed.wire().expect("cable is wired");
        assert!(red.same_template(explicit.wire().expect("door is wired")));
        assert!(!red.same_template(default.wire().expect("cable is wired")));
        assert_eq!(default.wire().map(|wire| wire.template().color()), Some("blue"));
    }

    #[test]
    fn underscored_variant_names_resolve_before_colours() {
        let factory = TileFactory::default();
        let args = TileArgs::default().with_direction(Direction::Left);

        assert_eq!(factory.build("rs_latch", &args).map(|tile| tile.name()), Ok("rs_latch"));
        assert_eq!(
            factory.build("ant_remains", &args).map(|tile| tile.name()),
            Ok("ant_remains")
        );
        assert_eq!(factory.build("rs_latch_green", &args).map(|tile| tile.name()), Ok("rs_latch"));
    }

    #[test]
    fn unknown_names_are_configuration_errors() {
        let factory = TileFactory::default();
        let args = TileArgs::default();

        assert_eq!(
            factory.build("teleporter", &args).map(|tile| tile.name()),
            Err(ConfigurationError::UnknownVariant {
                name: "teleporter".to_owned()
            })
        );
        assert_eq!(
            factory.build("cable_purple", &args).map(|tile| tile.name()),
            Err(ConfigurationError::UnknownColor {
                color: "purple".to_owned()
            })
        );
    }

    #[test]
    fn variants_reject_missing_or_invalid_arguments() {
        let factory = TileFactory::default();

        assert_eq!(
            factory.build("belt", &TileArgs::default()).map(|tile| tile.name()),
            Err(ConfigurationError::MissingArgument {
                variant: "belt",
                argument: "direction"
            })
        );
        assert!(matches!(
            factory.build("clock", &TileArgs::default().with_period(0, 0)),
            Err(ConfigurationError::InvalidArgument { argument: "period", .. })
        ));
        assert!(matches!(
            factory.build("machine", &TileArgs::default().with_product(ItemKind::Gear)),
            Err(ConfigurationError::InvalidArgument { argument: "product", .. })
        ));
    }

    #[test]
    fn added_colours_are_buildable() {
        let mut factory = TileFactory::default();
        let template = factory.add_color("purple");

        let tile = factory
            .build("cable_purple", &TileArgs::default())
            .expect("purple registered");

        assert!(Rc::ptr_eq(tile.wire().expect("wired").template(), &template));
        assert!(factory.variants().any(|name| name == "passage"));
        assert!(factory.template("purple").is_some());
    }
}
