//! A* over the 8-connected cell graph.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, HashMap, HashSet},
    f32::consts::SQRT_2,
};

use gridswarm_core::CellCoord;

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

/// Result of a single search.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SearchOutcome {
    /// Cells from start to goal, both inclusive.
    Found(Vec<CellCoord>),
    /// The open set drained without reaching the goal.
    Unreachable,
    /// The expansion budget ran out first.
    CapReached,
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f32,
    h: f32,
    cell: CellCoord,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then_with(|| self.h.total_cmp(&other.h))
            .then_with(|| self.cell.cmp(&other.cell))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

#[derive(Clone, Copy, Debug)]
struct NodeRecord {
    cost: f32,
    parent: Option<CellCoord>,
}

/// Runs A* from `start` to `goal`.
///
/// Duplicate heap entries are tolerated: a cell popped after it was already
/// closed is skipped. Diagonal steps require both orthogonal cells sharing the
/// crossed corner to be open.
pub(crate) fn astar<F>(start: CellCoord, goal: CellCoord, cap: u32, is_wall: &F) -> SearchOutcome
where
    F: Fn(CellCoord) -> bool,
{
    let mut open = BinaryHeap::new();
    let mut nodes: HashMap<CellCoord, NodeRecord> = HashMap::new();
    let mut closed: HashSet<CellCoord> = HashSet::new();
    let mut expansions = 0u32;

    let _ = nodes.insert(
        start,
        NodeRecord {
            cost: 0.0,
            parent: None,
        },
    );
    let h = heuristic(start, goal);
    open.push(Reverse(OpenEntry {
        f: h,
        h,
        cell: start,
    }));

    while let Some(Reverse(entry)) = open.pop() {
        if !closed.insert(entry.cell) {
            continue;
        }
        if entry.cell == goal {
            return SearchOutcome::Found(reconstruct(&nodes, goal));
        }
        if expansions >= cap {
            return SearchOutcome::CapReached;
        }
        expansions += 1;

        let current_cost = nodes.get(&entry.cell).map_or(0.0, |node| node.cost);
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let next = entry.cell.offset(dx, dy);
            if closed.contains(&next) || is_wall(next) {
                continue;
            }
            let diagonal = dx != 0 && dy != 0;
            if diagonal && (is_wall(entry.cell.offset(dx, 0)) || is_wall(entry.cell.offset(0, dy)))
            {
                continue;
            }

            let cost = current_cost + if diagonal { SQRT_2 } else { 1.0 };
            let improves = nodes.get(&next).map_or(true, |node| cost < node.cost);
            if !improves {
                continue;
            }
            let _ = nodes.insert(
                next,
                NodeRecord {
                    cost,
                    parent: Some(entry.cell),
                },
            );
            let h = heuristic(next, goal);
            open.push(Reverse(OpenEntry {
                f: cost + h,
                h,
                cell: next,
            }));
        }
    }

    SearchOutcome::Unreachable
}

fn heuristic(from: CellCoord, to: CellCoord) -> f32 {
    let dx = from.x().abs_diff(to.x()) as f32;
    let dy = from.y().abs_diff(to.y()) as f32;
    dx.hypot(dy)
}

fn reconstruct(nodes: &HashMap<CellCoord, NodeRecord>, goal: CellCoord) -> Vec<CellCoord> {
    let mut cells = vec![goal];
    let mut cursor = goal;
    while let Some(parent) = nodes.get(&cursor).and_then(|node| node.parent) {
        cells.push(parent);
        cursor = parent;
    }
    cells.reverse();
    cells
}

/// Keeps only the cells where the travel direction changes, plus the last one.
///
/// `cells[0]` is the start cell and is never returned.
pub(crate) fn collapse_collinear(cells: &[CellCoord]) -> Vec<CellCoord> {
    let mut kept: Vec<CellCoord> = cells
        .windows(3)
        .filter(|window| direction(window[0], window[1]) != direction(window[1], window[2]))
        .map(|window| window[1])
        .collect();
    if cells.len() > 1 {
        if let Some(last) = cells.last() {
            kept.push(*last);
        }
    }
    kept
}

fn direction(from: CellCoord, to: CellCoord) -> (i32, i32) {
    (
        to.x().saturating_sub(from.x()).signum(),
        to.y().saturating_sub(from.y()).signum(),
    )
}
