#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic pathfinding system that turns move orders into waypoint paths.

mod search;

use glam::Vec2;
use gridswarm_core::{CellCoord, Command, Event, GridGeometry, SimulationConfig};
use tracing::debug;

use self::search::{astar, collapse_collinear, SearchOutcome};

/// Pure system that answers move orders with path assignments.
#[derive(Debug)]
pub struct Pathfinding {
    finder: PathFinder,
}

impl Pathfinding {
    /// Creates a pathfinding system using the provided configuration.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            finder: PathFinder::new(config),
        }
    }

    /// Path finder used to serve move orders.
    #[must_use]
    pub fn finder(&self) -> &PathFinder {
        &self.finder
    }

    /// Consumes world events and emits one path assignment per issued move order.
    ///
    /// Orders that cannot be routed still receive an assignment carrying an
    /// empty path, which leaves the agent in direct movement toward the
    /// destination.
    pub fn handle<F>(&self, events: &[Event], is_wall: F, out: &mut Vec<Command>)
    where
        F: Fn(CellCoord) -> bool,
    {
        for event in events {
            let Event::MoveOrderIssued {
                agent,
                ticket,
                from,
                destination,
            } = event
            else {
                continue;
            };

            let path = self.finder.find_path(*from, *destination, &is_wall);
            debug!(
                agent = agent.get(),
                ticket = ticket.get(),
                waypoints = path.len(),
                "move order routed"
            );
            out.push(Command::AssignPath {
                agent: *agent,
                ticket: *ticket,
                path,
            });
        }
    }
}

/// Computes shortest waypoint paths through the wall field.
#[derive(Clone, Debug)]
pub struct PathFinder {
    geometry: GridGeometry,
    iteration_cap: u32,
    goal_search_radius: u32,
    collapse_collinear: bool,
}

impl PathFinder {
    /// Creates a path finder using the provided configuration.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            geometry: config.geometry(),
            iteration_cap: config.path_iteration_cap,
            goal_search_radius: config.goal_search_radius,
            collapse_collinear: config.collapse_collinear_waypoints,
        }
    }

    /// Finds waypoints leading from `start` to `goal`, both in world coordinates.
    ///
    /// Waypoints are cell centers. The start cell is never included, so an
    /// empty result means either that no path exists or that none is needed.
    /// A walled destination retargeted onto the start cell yields that cell's
    /// center as the single waypoint.
    pub fn find_path<F>(&self, start: Vec2, goal: Vec2, is_wall: F) -> Vec<Vec2>
    where
        F: Fn(CellCoord) -> bool,
    {
        let start_cell = self.geometry.cell_of(start);
        let goal_cell = self.geometry.cell_of(goal);
        self.find_cell_path(start_cell, goal_cell, &is_wall)
            .into_iter()
            .map(|cell| self.geometry.cell_center(cell))
            .collect()
    }

    /// Grid-space variant of [`PathFinder::find_path`].
    pub fn find_cell_path<F>(
        &self,
        start: CellCoord,
        goal: CellCoord,
        is_wall: &F,
    ) -> Vec<CellCoord>
    where
        F: Fn(CellCoord) -> bool,
    {
        let Some(resolved) = self.resolve_goal(goal, is_wall) else {
            debug!(x = goal.x(), y = goal.y(), "no open cell near walled destination");
            return Vec::new();
        };
        if resolved == start {
            return if resolved == goal {
                Vec::new()
            } else {
                vec![start]
            };
        }
        let goal = resolved;

        match astar(start, goal, self.iteration_cap, is_wall) {
            SearchOutcome::Found(cells) if self.collapse_collinear => collapse_collinear(&cells),
            SearchOutcome::Found(cells) => cells.into_iter().skip(1).collect(),
            SearchOutcome::Unreachable => {
                debug!(x = goal.x(), y = goal.y(), "destination unreachable");
                Vec::new()
            }
            SearchOutcome::CapReached => {
                debug!(
                    x = goal.x(),
                    y = goal.y(),
                    cap = self.iteration_cap,
                    "path search exhausted its expansion budget"
                );
                Vec::new()
            }
        }
    }

    /// Returns `goal` when it is open, otherwise the nearest open cell found in
    /// expanding square rings up to the configured radius.
    ///
    /// Within a ring the candidate closest to `goal` wins; ties go to the
    /// lower row, then the lower column.
    pub fn resolve_goal<F>(&self, goal: CellCoord, is_wall: &F) -> Option<CellCoord>
    where
        F: Fn(CellCoord) -> bool,
    {
        if !is_wall(goal) {
            return Some(goal);
        }

        let max_radius = i32::try_from(self.goal_search_radius).unwrap_or(i32::MAX);
        (1..=max_radius).find_map(|radius| {
            ring(goal, radius)
                .filter(|cell| !is_wall(*cell))
                .min_by_key(|cell| {
                    let dx = i64::from(cell.x()) - i64::from(goal.x());
                    let dy = i64::from(cell.y()) - i64::from(goal.y());
                    (dx * dx + dy * dy, cell.y(), cell.x())
                })
        })
    }
}

/// Cells at exactly Chebyshev distance `radius` from `center`.
fn ring(center: CellCoord, radius: i32) -> impl Iterator<Item = CellCoord> {
    (-radius..=radius)
        .flat_map(move |dy| (-radius..=radius).map(move |dx| (dx, dy)))
        .filter(move |(dx, dy)| dx.abs().max(dy.abs()) == radius)
        .map(move |(dx, dy)| center.offset(dx, dy))
}
