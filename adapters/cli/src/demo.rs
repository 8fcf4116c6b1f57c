//! Built-in levels used by the headless driver.

use ant_factory_core::{Direction, Orientation, Position};
use ant_factory_stage::{
    MirrorDiagonal, Pheromone, Stage, TileArgs, TileFactory, WarpTarget,
};
use ant_factory_system_warp::LevelRegistry;
use anyhow::{Context, Result};

/// Name of the level play starts on.
pub(crate) const WORKSHOP: &str = "workshop";
/// Name of the level reached through the workshop warp.
pub(crate) const LASER_HALL: &str = "laser_hall";

/// Builds every demo level and links them together.
pub(crate) fn registry() -> Result<LevelRegistry> {
    let factory = TileFactory::default();
    let mut registry = LevelRegistry::default();
    let _ = registry.insert(WORKSHOP, workshop(&factory).context("building workshop")?);
    let _ = registry.insert(LASER_HALL, laser_hall(&factory).context("building laser hall")?);
    registry
        .set_current(WORKSHOP)
        .context("selecting the starting level")?;
    Ok(registry)
}

struct Builder<'a> {
    factory: &'a TileFactory,
    stage: Stage,
}

impl Builder<'_> {
    fn place(&mut self, x: i32, y: i32, name: &str, args: TileArgs) -> Result<&mut Self> {
        let tile = self
            .factory
            .build(name, &args)
            .with_context(|| format!("constructing `{name}` for ({x}, {y})"))?;
        self.stage
            .place(Position::new(x, y), tile)
            .with_context(|| format!("placing `{name}`"))?;
        Ok(self)
    }

    fn simple(&mut self, x: i32, y: i32, name: &str) -> Result<&mut Self> {
        self.place(x, y, name, TileArgs::default())
    }

    fn wired(&mut self, x: i32, y: i32, name: &str, connections: u8) -> Result<&mut Self> {
        self.place(x, y, name, TileArgs::default().with_connections(connections))
    }
}

/// A corridor whose door opens while an ant stands on the button at the
/// end of the cable run. Worker ants follow the pheromone trail there.
fn workshop(factory: &TileFactory) -> Result<Stage> {
    let mut level = Builder {
        factory,
        stage: Stage::new(8, 8),
    };

    for x in 0..8 {
        let _ = level.simple(x, 0, "wall")?;
        let _ = level.simple(x, 1, "ground")?;
        let _ = level.simple(x, 2, "edge")?;
    }
    let _ = level
        .wired(2, 0, "door_blue", 0b0100)?
        .wired(2, 1, "cable_blue", 0b0101)?;
    for (x, y, bits) in [
        (2, 2, 0b0101),
        (2, 3, 0b0101),
        (2, 4, 0b0011),
        (3, 4, 0b1010),
        (4, 4, 0b1100),
        (4, 5, 0b0101),
    ] {
        let _ = level.simple(x, y, "ground")?.wired(x, y, "cable_blue", bits)?;
    }
    let _ = level
        .simple(2, 5, "edge")?
        .simple(3, 5, "edge")?
        .simple(4, 6, "ground")?
        .wired(4, 6, "button_blue", 0b0001)?
        .simple(4, 7, "edge")?
        .place(
            1,
            1,
            "help",
            TileArgs::default().with_text("Hold the button and the door opens."),
        )?;

    let mut stage = level.stage;
    for position in [Position::new(1, 1), Position::new(3, 1), Position::new(4, 1)] {
        let _ = stage
            .spawn_ant(position, position == Position::new(1, 1))
            .context("spawning workshop ants")?;
    }

    let trail = [
        (2, 1, Direction::Down),
        (2, 2, Direction::Down),
        (2, 3, Direction::Down),
        (2, 4, Direction::Right),
        (3, 4, Direction::Right),
        (4, 4, Direction::Down),
        (4, 5, Direction::Down),
    ];
    for (x, y, direction) in trail {
        stage.pheromones_mut().set(x, y, Pheromone::toward(direction));
    }

    let _ = stage.discover_networks().context("wiring workshop")?;
    stage.add_warp(
        Position::new(7, 1),
        WarpTarget::new(LASER_HALL, Some(Position::new(1, 1))),
    );
    Ok(stage)
}

/// A hall swept by a clock-driven laser that a mirror folds into the floor,
/// with a spike on the top row and a passage back to the workshop.
fn laser_hall(factory: &TileFactory) -> Result<Stage> {
    let mut level = Builder {
        factory,
        stage: Stage::new(8, 5),
    };

    for x in 0..8 {
        let _ = level.simple(x, 0, "wall")?.simple(x, 4, "edge")?;
        for y in 1..4 {
            if x > 0 || y == 1 {
                let _ = level.simple(x, y, "ground")?;
            }
        }
    }
    let _ = level
        .place(
            0,
            2,
            "laser_red",
            TileArgs::default()
                .with_connections(0b0100)
                .with_orientation(Orientation::Right),
        )?
        .place(
            0,
            3,
            "clock_red",
            TileArgs::default().with_connections(0b0001).with_period(4, 0),
        )?
        .place(
            5,
            2,
            "mirror",
            TileArgs::default().with_diagonal(MirrorDiagonal::Falling),
        )?
        .simple(3, 1, "spike")?
        .place(
            7,
            1,
            "passage",
            TileArgs::default().with_level(WORKSHOP, Some(Position::new(6, 1))),
        )?;

    let mut stage = level.stage;
    let _ = stage
        .spawn_ant(Position::new(1, 3), true)
        .context("spawning laser hall ant")?;
    let _ = stage.discover_networks().context("wiring laser hall")?;
    Ok(stage)
}
