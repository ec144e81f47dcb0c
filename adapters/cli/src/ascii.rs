//! Plain-text dump of the wall field around the swarm.

use std::collections::{BTreeMap, HashSet};

use gridswarm_core::{AgentView, CellCoord};
use gridswarm_world::WallMap;

const WALL: char = '#';
const OPEN: char = '.';
const AGENT: char = 'o';
const SELECTED: char = 'O';

/// Renders the cells spanned by the agents plus `margin` cells on every side.
///
/// Rows run from the smallest `y` downward. Cells holding a selected agent
/// are drawn as `O`, other occupied cells as `o`.
pub(crate) fn render(walls: WallMap, agents: &AgentView, margin: u32) -> String {
    let mut occupied: BTreeMap<CellCoord, bool> = BTreeMap::new();
    for agent in agents.iter() {
        let selected = occupied.entry(agent.cell).or_insert(false);
        *selected |= agent.selected;
    }

    let margin = i32::try_from(margin).unwrap_or(i32::MAX);
    let (min, max) = bounds(occupied.keys().copied());
    let min = min.offset(-margin, -margin);
    let max = max.offset(margin, margin);
    let wall_cells: HashSet<CellCoord> = walls.walls_in(min, max).collect();

    let mut out = String::new();
    for y in min.y()..=max.y() {
        for x in min.x()..=max.x() {
            let cell = CellCoord::new(x, y);
            let glyph = match occupied.get(&cell) {
                Some(true) => SELECTED,
                Some(false) => AGENT,
                None if wall_cells.contains(&cell) => WALL,
                None => OPEN,
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

fn bounds(cells: impl Iterator<Item = CellCoord>) -> (CellCoord, CellCoord) {
    let origin = CellCoord::new(0, 0);
    cells.fold(None, |acc: Option<(CellCoord, CellCoord)>, cell| {
        Some(match acc {
            None => (cell, cell),
            Some((min, max)) => (
                CellCoord::new(min.x().min(cell.x()), min.y().min(cell.y())),
                CellCoord::new(max.x().max(cell.x()), max.y().max(cell.y())),
            ),
        })
    })
    .unwrap_or((origin, origin))
}
