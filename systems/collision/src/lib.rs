#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic collision system that keeps agents apart and out of walls.
//!
//! Resolution runs once per tick on a scratch copy of agent positions. Agent
//! pairs are separated over a fixed number of relaxation passes, then every
//! agent is pushed out of the wall squares around it. Only agents whose
//! position changed receive a [`Command::RelocateAgent`].

mod separation;

use glam::Vec2;
use gridswarm_core::{
    AgentId, AgentView, CellCoord, Command, Event, GridGeometry, SimulationConfig,
};
use gridswarm_world::SpatialIndex;
use tracing::debug;

pub use self::separation::{push_out_of_square, separate_pair, PairBody};

/// Pure system that resolves overlaps after movement integration.
#[derive(Debug)]
pub struct Collision {
    radius: f32,
    geometry: GridGeometry,
    passes: u32,
    wall_sweeps: u32,
    reach: u32,
    bodies: Vec<Body>,
    displacements: Vec<Vec2>,
    scratch: SpatialIndex,
}

#[derive(Clone, Copy, Debug)]
struct Body {
    id: AgentId,
    start: Vec2,
    position: Vec2,
    selected: bool,
    cell: CellCoord,
}

impl Body {
    fn pair_body(&self) -> PairBody {
        PairBody {
            position: self.position,
            selected: self.selected,
        }
    }
}

impl Collision {
    /// Creates a collision system using the provided configuration.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        let reach = (2.0 * config.agent_radius / config.cell_size).ceil().max(1.0) as u32;
        Self {
            radius: config.agent_radius,
            geometry: config.geometry(),
            passes: config.relaxation_passes,
            wall_sweeps: config.wall_sweeps,
            reach,
            bodies: Vec::new(),
            displacements: Vec::new(),
            scratch: SpatialIndex::new(),
        }
    }

    /// Number of cells around an agent's own cell searched for partners.
    #[must_use]
    pub fn reach(&self) -> u32 {
        self.reach
    }

    /// Consumes world events and immutable views to emit relocation commands.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        agents: &AgentView,
        index: &SpatialIndex,
        is_wall: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(CellCoord) -> bool,
    {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        self.load(agents, index);

        let mut passes_run = 0;
        for _ in 0..self.passes {
            passes_run += 1;
            if !self.separation_pass(&is_wall) {
                break;
            }
        }
        self.wall_pass(&is_wall);

        let before = out.len();
        for body in &self.bodies {
            if body.position != body.start {
                out.push(Command::RelocateAgent {
                    agent: body.id,
                    position: body.position,
                });
            }
        }
        debug!(
            agents = self.bodies.len(),
            passes = passes_run,
            relocated = out.len() - before,
            "collisions resolved"
        );
    }

    fn load(&mut self, agents: &AgentView, index: &SpatialIndex) {
        self.bodies.clear();
        self.bodies.extend(agents.iter().map(|agent| Body {
            id: agent.id,
            start: agent.position,
            position: agent.position,
            selected: agent.selected,
            cell: agent.cell,
        }));
        self.scratch.clone_from(index);
    }

    /// Separates every overlapping pair once; returns whether anything moved.
    ///
    /// Displacements are computed from pass-start positions and applied
    /// together, so the result does not depend on pair visiting order.
    fn separation_pass<F>(&mut self, is_wall: &F) -> bool
    where
        F: Fn(CellCoord) -> bool,
    {
        self.displacements.clear();
        self.displacements.resize(self.bodies.len(), Vec2::ZERO);

        for (first, body) in self.bodies.iter().enumerate() {
            for other in self.scratch.query_within(body.cell, self.reach) {
                if other <= body.id {
                    continue;
                }
                let Ok(second) = self.bodies.binary_search_by_key(&other, |body| body.id) else {
                    continue;
                };
                let Some((push_first, push_second)) = separate_pair(
                    body.pair_body(),
                    self.bodies[second].pair_body(),
                    self.radius,
                    self.geometry,
                    is_wall,
                ) else {
                    continue;
                };
                self.displacements[first] += push_first;
                self.displacements[second] += push_second;
            }
        }

        let mut moved = false;
        for (body, displacement) in self.bodies.iter_mut().zip(&self.displacements) {
            if *displacement == Vec2::ZERO {
                continue;
            }
            moved = true;
            body.position += *displacement;
            let cell = self.geometry.cell_of(body.position);
            self.scratch.relocate(body.cell, cell, body.id);
            body.cell = cell;
        }
        moved
    }

    /// Pushes every agent out of the wall squares in its 3×3 neighborhood.
    ///
    /// Pushes for one agent are applied one after another in cell order and
    /// are not relaxed against each other. Additional sweeps only run when
    /// `wall_sweeps` asks for them and the previous sweep moved someone.
    fn wall_pass<F>(&mut self, is_wall: &F)
    where
        F: Fn(CellCoord) -> bool,
    {
        for _ in 0..self.wall_sweeps.max(1) {
            if !self.wall_sweep(is_wall) {
                break;
            }
        }
    }

    fn wall_sweep<F>(&mut self, is_wall: &F) -> bool
    where
        F: Fn(CellCoord) -> bool,
    {
        let size = self.geometry.cell_size();
        let mut moved = false;
        for body in &mut self.bodies {
            let center = self.geometry.cell_of(body.position);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    let cell = center.offset(dx, dy);
                    if !is_wall(cell) {
                        continue;
                    }
                    let pushed = push_out_of_square(
                        body.position,
                        self.geometry.cell_origin(cell),
                        size,
                        self.radius,
                    );
                    moved |= pushed != body.position;
                    body.position = pushed;
                }
            }
            body.cell = self.geometry.cell_of(body.position);
        }
        moved
    }
}
