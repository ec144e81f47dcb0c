use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use glam::Vec2;
use gridswarm_core::{AgentSnapshot, Event, SimulationConfig};
use gridswarm_simulation::Simulation;

#[test]
fn deterministic_replay_produces_identical_runs() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        first
            .events
            .iter()
            .any(|event| matches!(event, Event::AgentCellChanged { .. })),
        "scripted swarm never left its starting cells"
    );
}

fn replay() -> ReplayOutcome {
    let mut simulation = Simulation::new(SimulationConfig::default()).expect("valid config");
    let mut events = Vec::new();

    let agents: Vec<_> = (0..12)
        .map(|index| {
            let column = (index % 4) as f32;
            let row = (index / 4) as f32;
            simulation.spawn_agent(Vec2::new(column * 40.0 - 60.0, row * 40.0 - 40.0))
        })
        .collect();
    for agent in agents.iter().step_by(3) {
        simulation.set_selected(*agent, true).expect("agent exists");
    }

    let _ = simulation.issue_move_order(&agents, Vec2::new(1250.0, -730.0));
    for _ in 0..90 {
        events.extend(simulation.tick(Duration::from_millis(16)));
    }
    let _ = simulation.issue_move_order(&agents[..6], Vec2::new(-400.0, 900.0));
    for _ in 0..90 {
        events.extend(simulation.tick(Duration::from_millis(16)));
    }

    ReplayOutcome {
        agents: simulation.agents().into_vec(),
        events,
    }
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    agents: Vec<AgentSnapshot>,
    events: Vec<Event>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for agent in &self.agents {
            agent.id.hash(&mut hasher);
            agent.position.x.to_bits().hash(&mut hasher);
            agent.position.y.to_bits().hash(&mut hasher);
            agent.cell.hash(&mut hasher);
            agent.path.len().hash(&mut hasher);
        }
        self.events.len().hash(&mut hasher);
        hasher.finish()
    }
}
