//! TOML settings consumed by the headless adapter.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use gridswarm_core::SimulationConfig;
use serde::Deserialize;

/// Complete settings document: simulation parameters plus the scripted run.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Parameters handed to the simulation.
    pub(crate) simulation: SimulationConfig,
    /// Scripted scenario driven by the adapter.
    pub(crate) scenario: Scenario,
}

/// Describes the swarm that is spawned and the order it receives.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Scenario {
    /// Number of agents scattered around the origin.
    pub(crate) agents: usize,
    /// Seed for the spawn scatter.
    pub(crate) seed: u64,
    /// Half extent of the square the agents spawn in.
    pub(crate) spread: f32,
    /// Move order destination in world coordinates.
    pub(crate) destination: [f32; 2],
    /// Number of ticks simulated after the order.
    pub(crate) ticks: u32,
    /// Simulated duration of a single tick in milliseconds.
    pub(crate) tick_ms: u64,
    /// Whether every agent is selected before the order.
    pub(crate) select_all: bool,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            agents: 24,
            seed: 7,
            spread: 150.0,
            destination: [1500.0, 1500.0],
            ticks: 300,
            tick_ms: 16,
            select_all: false,
        }
    }
}

/// Loads settings from `path`, or returns the defaults when none is given.
pub(crate) fn load(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    parse(&text).with_context(|| format!("failed to parse settings in {}", path.display()))
}

/// Parses and validates a settings document.
pub(crate) fn parse(text: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(text)?;
    settings
        .simulation
        .validate()
        .context("invalid [simulation] section")?;
    Ok(settings)
}
