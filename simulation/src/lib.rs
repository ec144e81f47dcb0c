#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Facade that drives the Grid Swarm world and its systems.
//!
//! [`Simulation`] owns the authoritative [`World`] and the pure systems. Every
//! call is translated into [`Command`] values, applied through
//! [`world::apply`], and the resulting events are pumped through the systems
//! until no further commands are produced.

use std::time::Duration;

use glam::Vec2;
use gridswarm_core::{
    AgentId, AgentSnapshot, AgentView, Command, ConfigError, Event, SimulationConfig,
};
use gridswarm_system_collision::Collision;
use gridswarm_system_movement::Movement;
use gridswarm_system_pathfinding::Pathfinding;
use gridswarm_world::{self as world, query, World};
use thiserror::Error;
use tracing::{debug, info};

/// Errors reported by facade calls that name an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// No agent with the provided identifier exists.
    #[error("agent {} does not exist", .0.get())]
    UnknownAgent(AgentId),
}

/// Outcome of [`Simulation::issue_move_order`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveOrderReport {
    /// Agents that received a non-empty waypoint path.
    pub pathed: Vec<AgentId>,
    /// Agents that fell back to direct movement toward the destination.
    pub direct: Vec<AgentId>,
    /// Identifiers that named no existing agent and were skipped.
    pub unknown: Vec<AgentId>,
}

/// Single-threaded, tick-driven swarm simulation.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    pathfinding: Pathfinding,
    movement: Movement,
    collision: Collision,
}

impl Simulation {
    /// Creates a simulation after validating the configuration.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            cell_size = config.cell_size,
            wall_density = config.wall_density_percent,
            agent_radius = config.agent_radius,
            speed = config.speed,
            "simulation created"
        );
        Ok(Self {
            pathfinding: Pathfinding::new(&config),
            movement: Movement::new(&config),
            collision: Collision::new(&config),
            world: World::new(config),
        })
    }

    /// Spawns an agent at `position` and returns its identifier.
    pub fn spawn_agent(&mut self, position: Vec2) -> AgentId {
        let agent = query::next_agent_id(&self.world);
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::SpawnAgent { position }, &mut events);
        agent
    }

    /// Removes an agent from the world.
    pub fn despawn_agent(&mut self, agent: AgentId) -> Result<(), SimulationError> {
        self.ensure_exists(agent)?;
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::DespawnAgent { agent }, &mut events);
        Ok(())
    }

    /// Updates the selection flag of an agent.
    pub fn set_selected(&mut self, agent: AgentId, selected: bool) -> Result<(), SimulationError> {
        self.ensure_exists(agent)?;
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::SetSelected { agent, selected },
            &mut events,
        );
        Ok(())
    }

    /// Orders the listed agents toward `destination`.
    ///
    /// Paths are computed before this call returns. Agents without a path
    /// travel straight toward the destination; unknown identifiers are
    /// reported and skipped.
    pub fn issue_move_order(&mut self, agents: &[AgentId], destination: Vec2) -> MoveOrderReport {
        let mut report = MoveOrderReport::default();
        let mut known = Vec::with_capacity(agents.len());
        for &agent in agents {
            if query::agent(&self.world, agent).is_some() {
                known.push(agent);
            } else {
                report.unknown.push(agent);
            }
        }

        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::IssueMoveOrder {
                agents: known,
                destination,
            },
            &mut events,
        );

        for event in self.pump_pathfinding(events) {
            if let Event::PathAssigned {
                agent, waypoints, ..
            } = event
            {
                if waypoints == 0 {
                    report.direct.push(agent);
                } else {
                    report.pathed.push(agent);
                }
            }
        }
        debug!(
            x = destination.x,
            y = destination.y,
            pathed = report.pathed.len(),
            direct = report.direct.len(),
            unknown = report.unknown.len(),
            "move order issued"
        );
        report
    }

    /// Advances the simulation by `dt` and returns every event the tick produced.
    ///
    /// Movement integration runs first, collision resolution second.
    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        let mut tick_events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut tick_events);

        let mut commands = Vec::new();
        self.movement
            .handle(&tick_events, &query::agent_view(&self.world), &mut commands);
        let mut log = tick_events.clone();
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut log);
        }

        let walls = query::wall_map(&self.world);
        self.collision.handle(
            &tick_events,
            &query::agent_view(&self.world),
            query::spatial_index(&self.world),
            |cell| walls.is_wall(cell),
            &mut commands,
        );
        for command in commands {
            world::apply(&mut self.world, command, &mut log);
        }
        log
    }

    /// Authoritative world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only view of every agent in ascending identifier order.
    #[must_use]
    pub fn agents(&self) -> AgentView {
        query::agent_view(&self.world)
    }

    /// State of a single agent, if it exists.
    #[must_use]
    pub fn agent(&self, agent: AgentId) -> Option<AgentSnapshot> {
        query::agent(&self.world, agent)
    }

    /// Configuration the simulation runs with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        query::config(&self.world)
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick_index(&self) -> u64 {
        query::tick_index(&self.world)
    }

    fn ensure_exists(&self, agent: AgentId) -> Result<(), SimulationError> {
        query::agent(&self.world, agent)
            .map(|_| ())
            .ok_or(SimulationError::UnknownAgent(agent))
    }

    /// Feeds events to the pathfinding system until it stops answering.
    fn pump_pathfinding(&mut self, mut events: Vec<Event>) -> Vec<Event> {
        let walls = query::wall_map(&self.world);
        let mut log = Vec::new();
        loop {
            let mut commands = Vec::new();
            self.pathfinding
                .handle(&events, |cell| walls.is_wall(cell), &mut commands);
            log.append(&mut events);
            if commands.is_empty() {
                break;
            }
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
        log
    }
}
