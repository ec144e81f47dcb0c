#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a scripted Grid Swarm scenario headlessly.

mod ascii;
mod settings;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use gridswarm_core::{AgentId, Event};
use gridswarm_simulation::Simulation;
use gridswarm_world::query;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use self::settings::Settings;

/// Runs a swarm move order to completion and reports where everyone ended up.
#[derive(Parser, Debug)]
#[command(name = "gridswarm", version, about = "Headless grid swarm simulation")]
struct Cli {
    /// TOML settings file with optional [simulation] and [scenario] tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of agents to spawn.
    #[arg(long)]
    agents: Option<usize>,
    /// Seed for the spawn scatter.
    #[arg(long)]
    seed: Option<u64>,
    /// Half extent of the square agents spawn in.
    #[arg(long)]
    spread: Option<f32>,
    /// Destination x coordinate.
    #[arg(long, allow_hyphen_values = true)]
    destination_x: Option<f32>,
    /// Destination y coordinate.
    #[arg(long, allow_hyphen_values = true)]
    destination_y: Option<f32>,
    /// Number of ticks to simulate.
    #[arg(long)]
    ticks: Option<u32>,
    /// Duration of one tick in milliseconds.
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Overrides the wall density percentage.
    #[arg(long)]
    wall_density: Option<u8>,
    /// Selects every agent before issuing the order.
    #[arg(long)]
    select_all: bool,
    /// Prints the wall field around the swarm after the run.
    #[arg(long)]
    ascii: bool,
}

impl Cli {
    /// Layers command-line flags over the loaded settings.
    fn overlay(&self, mut settings: Settings) -> Settings {
        let scenario = &mut settings.scenario;
        if let Some(agents) = self.agents {
            scenario.agents = agents;
        }
        if let Some(seed) = self.seed {
            scenario.seed = seed;
        }
        if let Some(spread) = self.spread {
            scenario.spread = spread;
        }
        if let Some(x) = self.destination_x {
            scenario.destination[0] = x;
        }
        if let Some(y) = self.destination_y {
            scenario.destination[1] = y;
        }
        if let Some(ticks) = self.ticks {
            scenario.ticks = ticks;
        }
        if let Some(tick_ms) = self.tick_ms {
            scenario.tick_ms = tick_ms;
        }
        scenario.select_all |= self.select_all;
        if let Some(density) = self.wall_density {
            settings.simulation.wall_density_percent = density;
        }
        settings
    }
}

/// Entry point for the Grid Swarm command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.overlay(settings::load(cli.config.as_deref())?);
    let scenario = settings.scenario.clone();

    let mut simulation =
        Simulation::new(settings.simulation).context("invalid simulation configuration")?;
    let agents = scatter(&mut simulation, scenario.agents, scenario.seed, scenario.spread);
    if scenario.select_all {
        for agent in &agents {
            simulation.set_selected(*agent, true)?;
        }
    }

    let destination = Vec2::from(scenario.destination);
    let report = simulation.issue_move_order(&agents, destination);
    info!(
        agents = agents.len(),
        pathed = report.pathed.len(),
        direct = report.direct.len(),
        x = destination.x,
        y = destination.y,
        "move order issued"
    );
    if !report.direct.is_empty() {
        warn!(
            count = report.direct.len(),
            "some agents found no path and move directly"
        );
    }

    let dt = Duration::from_millis(scenario.tick_ms);
    let mut waypoints_reached = 0usize;
    let mut cell_changes = 0usize;
    for _ in 0..scenario.ticks {
        for event in simulation.tick(dt) {
            match event {
                Event::WaypointReached { .. } => waypoints_reached += 1,
                Event::AgentCellChanged { .. } => cell_changes += 1,
                _ => {}
            }
        }
    }

    let view = simulation.agents();
    let arrived = view.iter().filter(|agent| agent.path.is_empty()).count();
    let mean_distance = if view.is_empty() {
        0.0
    } else {
        view.iter()
            .map(|agent| agent.position.distance(destination))
            .sum::<f32>()
            / view.len() as f32
    };
    info!(
        ticks = simulation.tick_index(),
        waypoints_reached,
        cell_changes,
        arrived,
        mean_distance,
        "run complete"
    );

    if cli.ascii {
        let walls = query::wall_map(simulation.world());
        print!("{}", ascii::render(walls, &view, 3));
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Spawns `count` agents uniformly inside the square of half extent `spread`.
fn scatter(simulation: &mut Simulation, count: usize, seed: u64, spread: f32) -> Vec<AgentId> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let spread = spread.abs();
    (0..count)
        .map(|_| {
            let position = Vec2::new(
                rng.gen_range(-spread..=spread),
                rng.gen_range(-spread..=spread),
            );
            simulation.spawn_agent(position)
        })
        .collect()
}
