//! Plain-text rendering of a stage for terminal output.

use ant_factory_core::{LaserMask, Orientation, Position};
use ant_factory_stage::{query, Networks, Stage, Tile};

/// Draws one character per cell: ants first, then committed beams, then the
/// topmost tile.
pub(crate) fn render(stage: &Stage) -> String {
    let ants = query::ant_view(stage);
    let mut out = String::new();

    for y in 0..stage.height() as i32 {
        for x in 0..stage.width() as i32 {
            let position = Position::new(x, y);
            let ant = ants.iter().find(|snapshot| snapshot.position == position);
            let symbol = match ant {
                Some(snapshot) if snapshot.controlled => '@',
                Some(_) => 'a',
                None => beam_glyph(query::laser(stage, position)).unwrap_or_else(|| {
                    query::tile_stack(stage, position)
                        .last()
                        .map_or(' ', |tile| tile_glyph(tile, stage.networks()))
                }),
            };
            out.push(symbol);
        }
        out.push('\n');
    }
    out
}

fn beam_glyph(mask: LaserMask) -> Option<char> {
    let horizontal = mask.contains(Orientation::Right) || mask.contains(Orientation::Left);
    let vertical = mask.contains(Orientation::Up) || mask.contains(Orientation::Down);
    match (horizontal, vertical) {
        (true, true) => Some('+'),
        (true, false) => Some('-'),
        (false, true) => Some('|'),
        (false, false) => None,
    }
}

fn tile_glyph(tile: &Tile, networks: &Networks) -> char {
    match tile {
        Tile::Wall => '#',
        Tile::Edge => '_',
        Tile::Ground => '.',
        Tile::Help(_) => '?',
        Tile::Cable(_) => ':',
        Tile::Button(_) => 'o',
        Tile::Switch(_) => 's',
        Tile::Door(_) if tile.network_active(networks) => '\'',
        Tile::Door(_) => 'D',
        Tile::Spike(spike) if spike.is_jammed() => 'x',
        Tile::Spike(_) => '^',
        Tile::Mirror(_) => '/',
        Tile::LaserMachine(_) => 'L',
        Tile::AntRemains(_) => '%',
        Tile::Belt(_) => '=',
        Tile::Crane(_) => 'C',
        Tile::Machine(_) => 'M',
        Tile::Gate(_) => 'G',
        Tile::RsLatch(_) => 'R',
        Tile::Clock(_) => 'T',
        Tile::Passage(passage) if passage.is_open() => 'O',
        Tile::Passage(_) => 'P',
    }
}
