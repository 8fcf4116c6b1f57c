//! Read-only views over a stage for renderers and adapters.

use ant_factory_core::{AntId, Direction, Hazard, ItemKind, LaserMask, NetworkId, Position};

use crate::{Stage, Tile};

/// Tile stack at `position`, bottom first; empty outside the stage.
#[must_use]
pub fn tile_stack(stage: &Stage, position: Position) -> &[Tile] {
    stage.grid.stack(position)
}

/// Texture names for every tile at `position` in draw order.
#[must_use]
pub fn textures(stage: &Stage, position: Position) -> Vec<String> {
    stage
        .grid
        .stack(position)
        .iter()
        .flat_map(|tile| tile.textures(&stage.networks))
        .collect()
}

/// Most recently committed beam mask at `position`.
#[must_use]
pub fn laser(stage: &Stage, position: Position) -> LaserMask {
    stage.previous_laser.at(position)
}

/// Activation of the network `id`; unknown ids are inactive.
#[must_use]
pub fn network_active(stage: &Stage, id: NetworkId) -> bool {
    stage.networks.is_active(Some(id))
}

/// Captures a read-only view of the ants on the stage.
#[must_use]
pub fn ant_view(stage: &Stage) -> AntView {
    let controlled = stage.controlled_ant().map(|ant| ant.id());
    let snapshots = stage
        .ants
        .iter()
        .map(|ant| AntSnapshot {
            id: ant.id(),
            position: ant.position(),
            facing: ant.facing(),
            moving: ant.is_moving(),
            hazard: ant.hazard(),
            item: ant.item(),
            controlled: controlled == Some(ant.id()),
        })
        .collect();
    AntView { snapshots }
}

/// Read-only snapshot describing all ants on a stage, in sequence order.
#[derive(Clone, Debug)]
pub struct AntView {
    snapshots: Vec<AntSnapshot>,
}

impl AntView {
    /// Iterator over the captured ant snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &AntSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    pub fn into_vec(self) -> Vec<AntSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single ant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AntSnapshot {
    /// Stable identifier.
    pub id: AntId,
    /// Occupied cell.
    pub position: Position,
    /// Facing direction.
    pub facing: Direction,
    /// Indicates the ant moved this turn.
    pub moving: bool,
    /// Hazard the ant was marked by, if any.
    pub hazard: Option<Hazard>,
    /// Carried item.
    pub item: Option<ItemKind>,
    /// Indicates the ant receives intents.
    pub controlled: bool,
}

#[cfg(test)]
mod tests {
    use ant_factory_core::Position;

    use super::*;

    #[test]
    fn ant_view_marks_the_controlled_ant() {
        let mut stage = Stage::new(2, 1);
        let _ = stage.spawn_ant(Position::new(0, 0), false).expect("spawn");
        let second = stage.spawn_ant(Position::new(1, 0), true).expect("spawn");

        let controlled: Vec<_> = ant_view(&stage)
            .iter()
            .filter(|snapshot| snapshot.controlled)
            .map(|snapshot| snapshot.id)
            .collect();

        assert_eq!(controlled, vec![second]);
    }

    #[test]
    fn textures_follow_stack_order() {
        let mut stage = Stage::new(1, 1);
        stage.place(Position::new(0, 0), Tile::Ground).expect("inside stage");
        stage.place(Position::new(0, 0), Tile::Wall).expect("inside stage");

        assert_eq!(textures(&stage, Position::new(0, 0)), vec!["ground", "wall"]);
        assert!(tile_stack(&stage, Position::new(3, 3)).is_empty());
    }
}
