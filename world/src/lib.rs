#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Grid Swarm.

mod registry;
pub mod spatial;
pub mod walls;

use glam::Vec2;
use gridswarm_core::{
    AgentCommandError, AgentId, Command, Event, GridGeometry, SimulationConfig,
};
use tracing::{debug, trace};

use self::registry::{Agent, AgentRegistry};
pub use self::{spatial::SpatialIndex, walls::WallMap};

/// Represents the authoritative Grid Swarm world state.
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    geometry: GridGeometry,
    walls: WallMap,
    agents: AgentRegistry,
    index: SpatialIndex,
    tick_index: u64,
}

impl World {
    /// Creates an empty world governed by the provided configuration.
    ///
    /// The configuration is expected to have passed
    /// [`SimulationConfig::validate`].
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            geometry: config.geometry(),
            walls: WallMap::from_config(&config),
            agents: AgentRegistry::new(),
            index: SpatialIndex::new(),
            tick_index: 0,
            config,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnAgent { position } => {
            let cell = world.geometry.cell_of(position);
            let agent = world.agents.spawn(position, cell);
            world.index.add_agent(cell, agent);
            debug!(agent = agent.get(), x = position.x, y = position.y, "agent spawned");
            out_events.push(Event::AgentSpawned {
                agent,
                position,
                cell,
            });
        }
        Command::DespawnAgent { agent } => match world.agents.remove(agent) {
            Some(removed) => {
                let _ = world.index.remove_agent(removed.cell, agent);
                debug!(agent = agent.get(), "agent despawned");
                out_events.push(Event::AgentDespawned { agent });
            }
            None => reject(agent, out_events),
        },
        Command::SetSelected { agent, selected } => match world.agents.get_mut(agent) {
            Some(entry) => {
                entry.selected = selected;
                out_events.push(Event::SelectionChanged { agent, selected });
            }
            None => reject(agent, out_events),
        },
        Command::IssueMoveOrder {
            agents,
            destination,
        } => {
            for agent in agents {
                let Some(entry) = world.agents.get_mut(agent) else {
                    reject(agent, out_events);
                    continue;
                };
                let ticket = entry.accept_order(destination);
                out_events.push(Event::MoveOrderIssued {
                    agent,
                    ticket,
                    from: entry.position,
                    destination,
                });
            }
        }
        Command::AssignPath {
            agent,
            ticket,
            path,
        } => {
            let Some(entry) = world.agents.get_mut(agent) else {
                reject(agent, out_events);
                return;
            };
            if entry.ticket != ticket {
                debug!(
                    agent = agent.get(),
                    stale = ticket.get(),
                    current = entry.ticket.get(),
                    "discarding superseded path"
                );
                out_events.push(Event::PathAssignmentDiscarded { agent, ticket });
                return;
            }
            let waypoints = path.len();
            entry.install_path(path);
            out_events.push(Event::PathAssigned {
                agent,
                ticket,
                waypoints,
            });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            trace!(tick = world.tick_index, dt_secs = dt.as_secs_f32(), "tick");
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::AdvanceAgent {
            agent,
            position,
            waypoint_reached,
        } => {
            let Some(entry) = world.agents.get_mut(agent) else {
                reject(agent, out_events);
                return;
            };
            relocate(&mut world.index, world.geometry, entry, position, out_events);
            if !waypoint_reached {
                return;
            }
            if let Some(waypoint) = entry.consume_waypoint() {
                out_events.push(Event::WaypointReached {
                    agent,
                    waypoint,
                    remaining: entry.path.len(),
                });
            }
        }
        Command::RelocateAgent { agent, position } => {
            let Some(entry) = world.agents.get_mut(agent) else {
                reject(agent, out_events);
                return;
            };
            relocate(&mut world.index, world.geometry, entry, position, out_events);
        }
    }
}

/// Moves an agent and keeps its owning cell and index membership in step.
fn relocate(
    index: &mut SpatialIndex,
    geometry: GridGeometry,
    agent: &mut Agent,
    position: Vec2,
    out_events: &mut Vec<Event>,
) {
    agent.position = position;
    let cell = geometry.cell_of(position);
    if cell == agent.cell {
        return;
    }
    index.relocate(agent.cell, cell, agent.id);
    out_events.push(Event::AgentCellChanged {
        agent: agent.id,
        from: agent.cell,
        to: cell,
    });
    agent.cell = cell;
}

fn reject(agent: AgentId, out_events: &mut Vec<Event>) {
    debug!(agent = agent.get(), "command addressed a missing agent");
    out_events.push(Event::AgentCommandRejected {
        agent,
        reason: AgentCommandError::MissingAgent,
    });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use gridswarm_core::{
        AgentId, AgentSnapshot, AgentView, CellCoord, GridGeometry, SimulationConfig,
    };

    use super::{SpatialIndex, WallMap, World};

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }

    /// Grid geometry used to convert between world positions and cells.
    #[must_use]
    pub fn geometry(world: &World) -> GridGeometry {
        world.geometry
    }

    /// Obstacle oracle of the world.
    #[must_use]
    pub fn wall_map(world: &World) -> WallMap {
        world.walls
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Identifier the next spawned agent will receive.
    #[must_use]
    pub fn next_agent_id(world: &World) -> AgentId {
        world.agents.next_agent_id()
    }

    /// Number of agents currently in the world.
    #[must_use]
    pub fn agent_count(world: &World) -> usize {
        world.agents.len()
    }

    /// Captures a read-only view of every agent.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        AgentView::from_snapshots(world.agents.iter().map(|agent| agent.snapshot()).collect())
    }

    /// Captures the state of a single agent.
    #[must_use]
    pub fn agent(world: &World, agent: AgentId) -> Option<AgentSnapshot> {
        world.agents.get(agent).map(|entry| entry.snapshot())
    }

    /// Read-only access to the cell → agents index.
    #[must_use]
    pub fn spatial_index(world: &World) -> &SpatialIndex {
        &world.index
    }

    /// Agents owned by the 3×3 block of cells around `cell`.
    #[must_use]
    pub fn agents_near(world: &World, cell: CellCoord) -> Vec<AgentId> {
        world.index.query_neighbors(cell)
    }
}
