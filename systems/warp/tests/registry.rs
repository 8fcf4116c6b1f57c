use ant_factory_core::{Direction, Intent, Position};
use ant_factory_stage::{Stage, Tile, TileArgs, TileFactory, WarpTarget};
use ant_factory_system_warp::{LevelRegistry, WarpError};

fn floor(width: u32, height: u32) -> Stage {
    let mut stage = Stage::new(width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            stage
                .place(Position::new(x, y), Tile::Ground)
                .expect("inside stage");
        }
    }
    stage
}

fn passage(level: &str, target: Option<Position>) -> Tile {
    TileFactory::default()
        .build(
            "passage",
            &TileArgs::default().with_level(level, target),
        )
        .expect("passage")
}

#[test]
fn first_inserted_level_is_current() {
    let mut registry = LevelRegistry::default();
    assert!(registry.current().is_none());

    let _ = registry.insert("workshop", floor(2, 2));
    let _ = registry.insert("cellar", floor(2, 2));

    assert_eq!(registry.current_name(), Some("workshop"));
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["cellar", "workshop"]);
}

#[test]
fn switching_to_an_unknown_level_fails() {
    let mut registry = LevelRegistry::default();
    let _ = registry.insert("workshop", floor(1, 1));

    assert_eq!(
        registry.set_current("attic"),
        Err(WarpError::UnknownLevel("attic".to_owned()))
    );
    assert_eq!(registry.current_name(), Some("workshop"));
}

#[test]
fn warp_moves_play_and_the_arriving_ant() {
    let mut workshop = floor(2, 1);
    let _ = workshop.spawn_ant(Position::new(0, 0), true).expect("spawn");
    workshop.add_warp(
        Position::new(1, 0),
        WarpTarget::new("cellar", Some(Position::new(2, 2))),
    );
    let mut cellar = floor(3, 3);
    let _ = cellar.spawn_ant(Position::new(0, 0), true).expect("spawn");

    let mut registry = LevelRegistry::default();
    let _ = registry.insert("workshop", workshop);
    let _ = registry.insert("cellar", cellar);

    assert_eq!(registry.follow_warp(), Ok(None), "no warp under the ant yet");

    let _ = registry
        .current_mut()
        .expect("current level")
        .advance_turn(Intent::step(Direction::Right));
    let transition = registry
        .follow_warp()
        .expect("cellar is registered")
        .expect("ant stands on the warp");

    assert_eq!(transition.from(), "workshop");
    assert_eq!(transition.to(), "cellar");
    assert_eq!(transition.arrival(), Some(Position::new(2, 2)));
    assert_eq!(registry.current_name(), Some("cellar"));
    assert_eq!(
        registry
            .current()
            .and_then(Stage::controlled_ant)
            .map(|ant| ant.position()),
        Some(Position::new(2, 2))
    );
}

#[test]
fn warp_into_a_missing_level_keeps_the_current_one() {
    let mut workshop = floor(1, 1);
    let _ = workshop.spawn_ant(Position::new(0, 0), true).expect("spawn");
    workshop.add_warp(Position::new(0, 0), WarpTarget::new("attic", None));

    let mut registry = LevelRegistry::default();
    let _ = registry.insert("workshop", workshop);

    assert_eq!(
        registry.follow_warp(),
        Err(WarpError::UnknownLevel("attic".to_owned()))
    );
    assert_eq!(registry.current_name(), Some("workshop"));
}

#[test]
fn passages_open_only_toward_free_cells() {
    let mut hall = floor(3, 1);
    hall.place(Position::new(0, 0), passage("yard", Some(Position::new(0, 0))))
        .expect("inside stage");
    hall.place(Position::new(1, 0), passage("yard", Some(Position::new(1, 0))))
        .expect("inside stage");
    hall.place(Position::new(2, 0), passage("nowhere", None))
        .expect("inside stage");
    let mut yard = floor(2, 1);
    let _ = yard.spawn_ant(Position::new(1, 0), true).expect("spawn");

    let mut registry = LevelRegistry::default();
    let _ = registry.insert("yard", yard);
    let _ = registry.insert("hall", hall);

    assert_eq!(registry.resolve_passages("hall"), Ok(1));
    let hall = registry.get("hall").expect("hall");
    assert!(hall.is_passable(0, 0), "free target opens the passage");
    assert!(!hall.is_passable(1, 0), "occupied target keeps it shut");
    assert!(!hall.is_passable(2, 0), "missing level keeps it shut");
}

#[test]
fn walking_into_an_open_passage_follows_it() {
    let mut hall = floor(2, 1);
    hall.place(Position::new(1, 0), passage("yard", Some(Position::new(0, 0))))
        .expect("inside stage");
    let _ = hall.spawn_ant(Position::new(0, 0), true).expect("spawn");
    let mut yard = floor(2, 1);
    let _ = yard.spawn_ant(Position::new(1, 0), true).expect("spawn");

    let mut registry = LevelRegistry::default();
    let _ = registry.insert("hall", hall);
    let _ = registry.insert("yard", yard);
    registry.set_current("hall").expect("hall is registered");

    let _ = registry
        .current_mut()
        .expect("current level")
        .advance_turn(Intent::step(Direction::Right));
    let transition = registry
        .follow_warp()
        .expect("yard is registered")
        .expect("passage is open");

    assert_eq!(transition.to(), "yard");
    assert_eq!(transition.arrival(), Some(Position::new(0, 0)));
}
