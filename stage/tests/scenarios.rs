use ant_factory_core::{
    ConnectionMask, Direction, Event, Intent, Orientation, Passability, Position,
};
use ant_factory_stage::{
    bounce, query, send_laser, Grid, LaserGrid, MirrorDiagonal, MovePolicy, Network, Networks,
    Stage, Tile, TileAddress, TileArgs, TileFactory, MIRROR_BOUNCE,
};

fn row(tiles: Vec<Tile>) -> Stage {
    let mut stage = Stage::new(tiles.len() as u32, 1);
    for (x, tile) in tiles.into_iter().enumerate() {
        stage
            .place(Position::new(x as i32, 0), tile)
            .expect("inside stage");
    }
    stage
}

#[test]
fn blocked_move_still_turns_the_ant() {
    let mut stage = row(vec![Tile::Wall, Tile::Ground, Tile::Edge]);
    let ant = stage.spawn_ant(Position::new(1, 0), true).expect("spawn");

    assert!(!stage.move_ant(ant, 1, 0, MovePolicy::Swap));

    let ant = &stage.ants()[0];
    assert_eq!(ant.position(), Position::new(1, 0), "edge must block the move");
    assert_eq!(ant.facing(), Direction::Right, "facing updates before blocking");
    assert!(!ant.is_moving());
}

#[test]
fn adjacent_cables_share_one_network() {
    let factory = TileFactory::default();
    let args = TileArgs::default().with_connections(0b1010);
    let mut stage = Stage::new(2, 1);
    stage
        .place(Position::new(0, 0), Tile::Ground)
        .expect("inside stage");
    stage
        .place(
            Position::new(0, 0),
            factory.build("button", &args).expect("button"),
        )
        .expect("inside stage");
    stage
        .place(
            Position::new(1, 0),
            factory.build("cable", &args).expect("cable"),
        )
        .expect("inside stage");
    let network = Network::build_from(&mut stage, 0, 0, 1).expect("button is wired");
    let _ = stage.spawn_ant(Position::new(0, 0), true).expect("spawn");

    stage.update();

    let cable = stage.grid().get(1, 0)[0].wire().expect("cable is wired");
    assert_eq!(cable.network(), Some(network));
    assert!(stage.networks().is_active(cable.network()));
    assert_eq!(stage.networks().get(network).map(Network::len), Some(2));
}

#[test]
fn falling_mirror_turns_a_rightward_beam_down() {
    let factory = TileFactory::default();
    let mut grid = Grid::new(5, 2);
    for x in 0..5 {
        grid.push(x, 0, Tile::Ground);
        grid.push(x, 1, Tile::Ground);
    }
    grid.push(
        3,
        0,
        factory
            .build(
                "mirror",
                &TileArgs::default().with_diagonal(MirrorDiagonal::Falling),
            )
            .expect("mirror"),
    );
    let networks = Networks::default();
    let mut target = LaserGrid::new(5, 2);

    send_laser(
        &mut grid,
        &networks,
        &mut target,
        Position::new(0, 0),
        Orientation::Right,
    );

    assert!(target.get(1, 0).contains(Orientation::Right));
    assert!(target.get(2, 0).contains(Orientation::Right));
    assert!(target.get(3, 0).is_empty(), "mirrors are not marked");
    assert!(target.get(4, 0).is_empty(), "beam must leave the row");
    assert_eq!(target.get(3, 1).bits(), 1 << Orientation::Down.code());
}

#[test]
fn push_into_a_third_ant_moves_nobody() {
    let mut stage = row(vec![Tile::Ground, Tile::Ground, Tile::Ground, Tile::Ground]);
    let pusher = stage.spawn_ant(Position::new(0, 0), true).expect("spawn");
    let _ = stage.spawn_ant(Position::new(1, 0), false).expect("spawn");
    let _ = stage.spawn_ant(Position::new(2, 0), false).expect("spawn");

    assert!(!stage.move_ant(pusher, 1, 0, MovePolicy::Push));

    let positions: Vec<_> = stage.ants().iter().map(|ant| ant.position()).collect();
    assert_eq!(
        positions,
        vec![
            Position::new(0, 0),
            Position::new(1, 0),
            Position::new(2, 0)
        ]
    );
    assert!(stage.ants().iter().all(|ant| !ant.is_moving()));
}

#[test]
fn push_against_a_wall_is_transactional() {
    let mut stage = row(vec![Tile::Ground, Tile::Ground, Tile::Wall]);
    let pusher = stage.spawn_ant(Position::new(0, 0), true).expect("spawn");
    let _ = stage.spawn_ant(Position::new(1, 0), false).expect("spawn");

    assert!(!stage.move_ant(pusher, 1, 0, MovePolicy::Push));
    assert_eq!(stage.ants()[0].position(), Position::new(0, 0));
    assert_eq!(stage.ants()[1].position(), Position::new(1, 0));
}

#[test]
fn bounce_table_matches_both_diagonals() {
    for incoming in Orientation::ALL {
        for diagonal in [MirrorDiagonal::Falling, MirrorDiagonal::Rising] {
            let offset = diagonal.bounce_offset();
            let expected = MIRROR_BOUNCE[incoming.code() + offset];
            assert_eq!(
                bounce(incoming, offset).code(),
                expected,
                "bounce mismatch for {incoming:?} on {diagonal:?}"
            );
        }
    }
}

#[test]
fn topmost_overriding_tile_decides_passability() {
    let factory = TileFactory::default();
    let door = || factory.build("door", &TileArgs::default()).expect("door");
    let cases: Vec<(Vec<Tile>, bool)> = vec![
        (vec![], false),
        (vec![Tile::Ground], true),
        (vec![Tile::Ground, Tile::Wall], false),
        (vec![Tile::Wall, Tile::Ground], true),
        (vec![Tile::Ground, door()], false),
        (
            vec![
                Tile::Ground,
                factory.build("cable", &TileArgs::default()).expect("cable"),
            ],
            true,
        ),
        (
            vec![factory
                .build("help", &TileArgs::default().with_text("hi"))
                .expect("help")],
            false,
        ),
    ];

    let networks = Networks::default();
    for (stack, expected) in cases {
        let names: Vec<_> = stack.iter().map(Tile::name).collect();
        let folded = stack
            .iter()
            .map(|tile| tile.passability(&networks))
            .filter(|policy| *policy != Passability::Ignore)
            .last()
            .map_or(false, |policy| policy == Passability::Open);
        let mut stage = Stage::new(1, 1);
        stage.grid_mut().set(0, 0, stack);

        assert_eq!(stage.is_passable(0, 0), expected, "stack {names:?}");
        assert_eq!(folded, expected, "last override for {names:?}");
    }
}

#[test]
fn network_discovery_is_independent_of_the_start_tile() {
    let factory = TileFactory::default();
    let mut grid = Grid::new(3, 2);
    let layout = [
        ((0, 0), 0b0110),
        ((1, 0), 0b1010),
        ((2, 0), 0b1100),
        ((0, 1), 0b0011),
        ((1, 1), 0b1010),
        ((2, 1), 0b1001),
    ];
    for ((x, y), bits) in layout {
        grid.push(
            x,
            y,
            factory
                .build("cable", &TileArgs::default().with_connections(bits))
                .expect("cable"),
        );
    }
    grid.push(
        1,
        1,
        factory
            .build("cable_red", &TileArgs::default().with_connections(0b1111))
            .expect("red cable"),
    );

    let mut reference: Option<Vec<TileAddress>> = None;
    for ((x, y), _) in layout {
        let start = TileAddress::new(Position::new(x, y), 0);
        let mut members = Network::discover(&grid, start)
            .expect("cable is wired")
            .members()
            .to_vec();
        members.sort();
        assert_eq!(members.len(), 6, "loop from {start:?} is complete");
        match &reference {
            Some(expected) => assert_eq!(&members, expected, "start {start:?} diverged"),
            None => reference = Some(members),
        }
    }
}

#[test]
fn connection_masks_read_up_right_down_left() {
    let mask = ConnectionMask::new(0b1010);

    assert!(mask.contains(Direction::Right));
    assert!(mask.contains(Direction::Left));
    assert!(!mask.contains(Direction::Up));
    assert!(!mask.contains(Direction::Down));
}

#[test]
fn mirror_cycle_is_cut_off_by_the_step_cap() {
    let factory = TileFactory::default();
    let mut grid = Grid::new(3, 3);
    for y in 0..3 {
        for x in 0..3 {
            grid.push(x, y, Tile::Ground);
        }
    }
    let corners = [
        ((0, 0), MirrorDiagonal::Rising),
        ((2, 0), MirrorDiagonal::Falling),
        ((2, 2), MirrorDiagonal::Rising),
        ((0, 2), MirrorDiagonal::Falling),
    ];
    for ((x, y), diagonal) in corners {
        grid.push(
            x,
            y,
            factory
                .build("mirror", &TileArgs::default().with_diagonal(diagonal))
                .expect("mirror"),
        );
    }
    let networks = Networks::default();
    let mut target = LaserGrid::new(3, 3);

    send_laser(
        &mut grid,
        &networks,
        &mut target,
        Position::new(0, 0),
        Orientation::Right,
    );

    assert_eq!(target.get(1, 0).bits(), 1 << Orientation::Right.code());
    assert_eq!(target.get(2, 1).bits(), 1 << Orientation::Down.code());
    assert_eq!(target.get(1, 2).bits(), 1 << Orientation::Left.code());
    assert_eq!(target.get(0, 1).bits(), 1 << Orientation::Up.code());
    assert!(target.get(1, 1).is_empty(), "the loop never crosses the centre");
    match &grid.get(0, 0)[1] {
        Tile::Mirror(mirror) => {
            assert!(mirror.hits().contains(Orientation::Up), "beam came back around");
        }
        other => panic!("expected a mirror, found {other:?}"),
    }
}

#[test]
fn powered_mirror_switches_diagonal() {
    let factory = TileFactory::default();
    let mut stage = Stage::new(4, 3);
    for y in 0..3 {
        for x in 0..4 {
            stage
                .place(Position::new(x, y), Tile::Ground)
                .expect("inside stage");
        }
    }
    let wiring = [
        ((0, 1), "laser", 0b0100),
        ((0, 2), "button", 0b0011),
        ((1, 2), "cable", 0b1010),
        ((2, 2), "cable", 0b1001),
        ((2, 1), "mirror", 0b0100),
    ];
    for ((x, y), name, bits) in wiring {
        let args = TileArgs::default()
            .with_connections(bits)
            .with_orientation(Orientation::Right)
            .with_diagonal(MirrorDiagonal::Falling);
        stage
            .place(
                Position::new(x, y),
                factory.build(name, &args).expect("wired tile"),
            )
            .expect("inside stage");
    }
    let networks = stage.discover_networks().expect("networks");
    assert_eq!(networks.len(), 1, "laser, button and mirror share one network");
    let _ = stage.spawn_ant(Position::new(0, 2), true).expect("spawn");

    let _ = stage.advance_turn(Intent::Idle);

    assert!(query::network_active(&stage, networks[0]));
    assert!(query::laser(&stage, Position::new(1, 1)).contains(Orientation::Right));
    assert_eq!(
        query::laser(&stage, Position::new(2, 0)).bits(),
        1 << Orientation::Up.code(),
        "an active network flips the falling mirror upward"
    );
    assert!(query::laser(&stage, Position::new(2, 2)).is_empty());
}

#[test]
fn rebuilding_a_network_keeps_a_single_entry() {
    let factory = TileFactory::default();
    let args = TileArgs::default().with_connections(0b1010);
    let mut stage = row(vec![Tile::Ground, Tile::Ground]);
    stage
        .place(
            Position::new(0, 0),
            factory.build("button", &args).expect("button"),
        )
        .expect("inside stage");
    stage
        .place(
            Position::new(1, 0),
            factory.build("cable", &args).expect("cable"),
        )
        .expect("inside stage");
    let first = Network::build_from(&mut stage, 0, 0, 1).expect("button is wired");

    let rebuilt = Network::build_from(&mut stage, 1, 0, 1).expect("cable is wired");

    assert_eq!(rebuilt, first, "rebuild reuses the id of its members");
    assert_eq!(stage.network_states().len(), 1);
    assert_eq!(stage.networks().iter().count(), 1);

    let _ = stage.spawn_ant(Position::new(0, 0), true).expect("spawn");
    let report = stage.advance_turn(Intent::Idle);
    let changes: Vec<_> = report
        .events()
        .iter()
        .filter(|event| matches!(event, Event::NetworkChanged { .. }))
        .collect();
    assert_eq!(
        changes,
        vec![&Event::NetworkChanged {
            network: first,
            active: true,
        }]
    );
}
