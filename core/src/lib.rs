#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Contracts shared by every Grid Swarm crate.
//!
//! Callers never touch agent state directly. They describe a change as a
//! [`Command`], the world crate applies it and reports what happened as
//! [`Event`] values. Systems read those events together with an
//! [`AgentView`] snapshot and reply with further commands.

mod config;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{ConfigError, SimulationConfig};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests that a new agent be created at the provided world position.
    SpawnAgent {
        /// World-space position of the agent's center.
        position: Vec2,
    },
    /// Requests that an agent be removed from the world.
    DespawnAgent {
        /// Identifier of the agent to remove.
        agent: AgentId,
    },
    /// Updates the selection flag of an agent.
    SetSelected {
        /// Identifier of the agent whose selection changes.
        agent: AgentId,
        /// Whether the agent is selected after the command.
        selected: bool,
    },
    /// Orders every listed agent to travel toward a destination.
    IssueMoveOrder {
        /// Agents that receive the order, processed in the provided order.
        agents: Vec<AgentId>,
        /// Destination expressed in world coordinates.
        destination: Vec2,
    },
    /// Installs a computed path on an agent, replacing any previous path.
    AssignPath {
        /// Identifier of the agent receiving the path.
        agent: AgentId,
        /// Move order the path was computed for.
        ticket: OrderTicket,
        /// Waypoints in travel order; empty selects direct movement.
        path: Vec<Vec2>,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Moves an agent as part of path-following integration.
    AdvanceAgent {
        /// Identifier of the agent that moved.
        agent: AgentId,
        /// New world-space position of the agent.
        position: Vec2,
        /// Whether the agent snapped onto the head waypoint of its path.
        waypoint_reached: bool,
    },
    /// Corrects an agent's position after collision resolution.
    RelocateAgent {
        /// Identifier of the agent being corrected.
        agent: AgentId,
        /// Corrected world-space position.
        position: Vec2,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a new agent joined the world.
    AgentSpawned {
        /// Identifier allocated to the agent.
        agent: AgentId,
        /// World-space position the agent spawned at.
        position: Vec2,
        /// Grid cell that owns the agent after spawning.
        cell: CellCoord,
    },
    /// Confirms that an agent left the world.
    AgentDespawned {
        /// Identifier of the removed agent.
        agent: AgentId,
    },
    /// Confirms a selection flag update.
    SelectionChanged {
        /// Identifier of the agent.
        agent: AgentId,
        /// Selection flag after the update.
        selected: bool,
    },
    /// Announces that an agent received a move order and awaits a path.
    MoveOrderIssued {
        /// Identifier of the ordered agent.
        agent: AgentId,
        /// Ticket identifying this order for the agent.
        ticket: OrderTicket,
        /// Agent position at the time the order was accepted.
        from: Vec2,
        /// Requested destination in world coordinates.
        destination: Vec2,
    },
    /// Confirms that a path was installed on an agent.
    PathAssigned {
        /// Identifier of the agent.
        agent: AgentId,
        /// Ticket of the order the path belongs to.
        ticket: OrderTicket,
        /// Number of waypoints installed; zero means direct movement.
        waypoints: usize,
    },
    /// Reports that a path arrived for an order that was already superseded.
    PathAssignmentDiscarded {
        /// Identifier of the agent.
        agent: AgentId,
        /// Outdated ticket carried by the discarded assignment.
        ticket: OrderTicket,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports that an agent consumed the head waypoint of its path.
    WaypointReached {
        /// Identifier of the agent.
        agent: AgentId,
        /// Waypoint that was consumed.
        waypoint: Vec2,
        /// Waypoints still queued after this one.
        remaining: usize,
    },
    /// Reports that an agent crossed into a different grid cell.
    AgentCellChanged {
        /// Identifier of the agent.
        agent: AgentId,
        /// Cell the agent occupied before moving.
        from: CellCoord,
        /// Cell the agent occupies afterwards.
        to: CellCoord,
    },
    /// Reports that a command addressed an agent it could not act upon.
    AgentCommandRejected {
        /// Identifier named by the rejected command.
        agent: AgentId,
        /// Specific reason the command failed.
        reason: AgentCommandError,
    },
}

/// Reasons a world command addressed to an agent may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum AgentCommandError {
    /// No agent with the provided identifier exists.
    #[error("agent does not exist")]
    MissingAgent,
}

/// Unique identifier assigned to an agent. Identifiers are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u64);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Identifier that follows this one in allocation order.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Per-agent move order counter used to discard superseded path results.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct OrderTicket(u32);

impl OrderTicket {
    /// Creates a ticket with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the ticket.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Ticket issued for the order that supersedes this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Location of a single grid cell in the unbounded world grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal cell index.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical cell index.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the cell displaced by the provided offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    /// Computes the Chebyshev (king move) distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Reports whether `other` is one of the eight cells surrounding this one.
    #[must_use]
    pub fn is_neighbor_of(self, other: CellCoord) -> bool {
        self.chebyshev_distance(other) == 1
    }
}

/// Conversion between world coordinates and grid cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    cell_size: f32,
}

impl GridGeometry {
    /// Creates a geometry with square cells of the provided side length.
    #[must_use]
    pub const fn new(cell_size: f32) -> Self {
        Self { cell_size }
    }

    /// Side length of a single cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell that contains the provided world position (floor division).
    #[must_use]
    pub fn cell_of(&self, position: Vec2) -> CellCoord {
        let scaled = (position / self.cell_size).floor();
        CellCoord::new(scaled.x as i32, scaled.y as i32)
    }

    /// World-space corner of the cell with the smallest coordinates.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(cell.x() as f32, cell.y() as f32) * self.cell_size
    }

    /// World-space center of the cell, used as a waypoint.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        self.cell_origin(cell) + Vec2::splat(self.cell_size * 0.5)
    }
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// World-space position of the agent's center.
    pub position: Vec2,
    /// Position the agent currently travels toward.
    pub target: Vec2,
    /// Remaining waypoints in travel order.
    pub path: Vec<Vec2>,
    /// Whether the controller has the agent selected.
    pub selected: bool,
    /// Grid cell that owns the agent.
    pub cell: CellCoord,
    /// Ticket of the most recent move order.
    pub ticket: OrderTicket,
}

/// Read-only snapshot describing all agents in the world.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for the provided agent.
    #[must_use]
    pub fn get(&self, agent: AgentId) -> Option<&AgentSnapshot> {
        self.snapshots
            .binary_search_by_key(&agent, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of agents captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_of_floors_negative_coordinates() {
        let geometry = GridGeometry::new(100.0);
        assert_eq!(geometry.cell_of(Vec2::new(0.0, 0.0)), CellCoord::new(0, 0));
        assert_eq!(geometry.cell_of(Vec2::new(99.9, 100.0)), CellCoord::new(0, 1));
        assert_eq!(geometry.cell_of(Vec2::new(-0.5, -100.0)), CellCoord::new(-1, -1));
        assert_eq!(geometry.cell_of(Vec2::new(-100.5, 250.0)), CellCoord::new(-2, 2));
    }

    #[test]
    fn cell_center_sits_half_a_cell_from_origin() {
        let geometry = GridGeometry::new(100.0);
        assert_eq!(geometry.cell_center(CellCoord::new(5, 5)), Vec2::new(550.0, 550.0));
        assert_eq!(geometry.cell_center(CellCoord::new(-1, 0)), Vec2::new(-50.0, 50.0));
        let cell = CellCoord::new(-3, 7);
        assert_eq!(geometry.cell_of(geometry.cell_center(cell)), cell);
    }

    #[test]
    fn neighbors_are_one_king_move_apart() {
        let origin = CellCoord::new(0, 0);
        assert!(origin.is_neighbor_of(CellCoord::new(1, 1)));
        assert!(origin.is_neighbor_of(CellCoord::new(-1, 0)));
        assert!(!origin.is_neighbor_of(origin));
        assert!(!origin.is_neighbor_of(CellCoord::new(2, 1)));
        assert_eq!(origin.chebyshev_distance(CellCoord::new(-3, 2)), 3);
    }

    #[test]
    fn agent_view_orders_and_finds_snapshots() {
        let snapshot = |id: u64| AgentSnapshot {
            id: AgentId::new(id),
            position: Vec2::ZERO,
            target: Vec2::ZERO,
            path: Vec::new(),
            selected: false,
            cell: CellCoord::new(0, 0),
            ticket: OrderTicket::default(),
        };
        let view = AgentView::from_snapshots(vec![snapshot(7), snapshot(2), snapshot(4)]);

        let ids: Vec<u64> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(ids, vec![2, 4, 7]);
        assert!(view.get(AgentId::new(4)).is_some());
        assert!(view.get(AgentId::new(5)).is_none());
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn identifiers_advance_monotonically() {
        assert_eq!(AgentId::new(3).next(), AgentId::new(4));
        assert_eq!(OrderTicket::new(9).next(), OrderTicket::new(10));
    }
}
