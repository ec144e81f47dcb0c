#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that advances agents along their paths.

use std::time::Duration;

use gridswarm_core::{AgentSnapshot, AgentView, Command, Event, SimulationConfig};
use tracing::trace;

/// Distance under which an agent counts as standing on its goal.
pub const ARRIVAL_EPSILON: f32 = 1e-3;

/// Pure system that reacts to time advancing and emits advance commands.
#[derive(Debug)]
pub struct Movement {
    speed: f32,
}

impl Movement {
    /// Creates a movement system using the configured travel speed.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            speed: config.speed,
        }
    }

    /// Travel speed in world units per second.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Consumes world events and the agent view to emit movement commands.
    ///
    /// Agents advance once per `TimeAdvanced` event, in ascending identifier
    /// order, by at most `speed × dt`.
    pub fn handle(&mut self, events: &[Event], agents: &AgentView, out: &mut Vec<Command>) {
        for event in events {
            let Event::TimeAdvanced { dt } = event else {
                continue;
            };
            let budget = self.budget(*dt);
            if budget <= 0.0 {
                continue;
            }
            for agent in agents.iter() {
                if let Some(command) = step(agent, budget) {
                    out.push(command);
                }
            }
        }
    }

    fn budget(&self, dt: Duration) -> f32 {
        self.speed * dt.as_secs_f32()
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}

/// Computes the advance command for a single agent, if it has to move.
fn step(agent: &AgentSnapshot, budget: f32) -> Option<Command> {
    let following_path = !agent.path.is_empty();
    let goal = agent.path.first().copied().unwrap_or(agent.target);
    let delta = goal - agent.position;
    let distance = delta.length();

    if distance <= ARRIVAL_EPSILON {
        // A waypoint reached by collision correction still has to be consumed.
        return following_path.then_some(Command::AdvanceAgent {
            agent: agent.id,
            position: agent.position,
            waypoint_reached: true,
        });
    }

    let (position, waypoint_reached) = if distance > budget {
        (agent.position + delta / distance * budget, false)
    } else {
        (goal, following_path)
    };
    trace!(
        agent = agent.id.get(),
        x = position.x,
        y = position.y,
        waypoint_reached,
        "agent advanced"
    );
    Some(Command::AdvanceAgent {
        agent: agent.id,
        position,
        waypoint_reached,
    })
}
