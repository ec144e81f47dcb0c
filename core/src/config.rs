//! Construction-time parameters shared by the world and every system.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::GridGeometry;

/// Tunable parameters consumed when the simulation is constructed.
///
/// Every field has a default, so partial TOML documents deserialize cleanly.
/// Unknown keys are rejected so a misspelled parameter never goes unnoticed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Side length of a grid cell in world units.
    pub cell_size: f32,
    /// Chance, in percent, that a cell outside the protected region is a wall.
    pub wall_density_percent: u8,
    /// Chebyshev radius around the origin cell that is always open.
    pub protected_radius: u32,
    /// Collision radius of every agent in world units.
    pub agent_radius: f32,
    /// Agent travel speed in world units per second.
    pub speed: f32,
    /// Number of agent-agent separation sweeps per tick.
    pub relaxation_passes: u32,
    /// Number of agent-wall push-out sweeps per tick.
    pub wall_sweeps: u32,
    /// Maximum node expansions a single path search may perform.
    pub path_iteration_cap: u32,
    /// Largest ring radius searched when a destination cell is a wall.
    pub goal_search_radius: u32,
    /// Merges waypoints that continue in the same grid direction.
    pub collapse_collinear_waypoints: bool,
}

impl SimulationConfig {
    /// Grid geometry derived from the configured cell size.
    #[must_use]
    pub const fn geometry(&self) -> GridGeometry {
        GridGeometry::new(self.cell_size)
    }

    /// Checks that every parameter lies within its usable range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("cell_size", self.cell_size)?;
        positive("agent_radius", self.agent_radius)?;
        positive("speed", self.speed)?;
        if self.wall_density_percent > 100 {
            return Err(ConfigError::DensityOutOfRange(self.wall_density_percent));
        }
        if self.protected_radius > i32::MAX as u32 {
            return Err(ConfigError::ProtectedRadiusTooLarge(self.protected_radius));
        }
        if self.path_iteration_cap == 0 {
            return Err(ConfigError::ZeroIterationCap);
        }
        if self.wall_sweeps == 0 {
            return Err(ConfigError::ZeroWallSweeps);
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cell_size: 100.0,
            wall_density_percent: 25,
            protected_radius: 2,
            agent_radius: 57.0,
            speed: 1000.0,
            relaxation_passes: 5,
            wall_sweeps: 1,
            path_iteration_cap: 20_000,
            goal_search_radius: 3,
            collapse_collinear_waypoints: true,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// Reasons a [`SimulationConfig`] may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A length or rate parameter is zero, negative, or not finite.
    #[error("`{field}` must be a finite positive number, got {value}")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Value supplied for the field.
        value: f32,
    },
    /// Wall density exceeds one hundred percent.
    #[error("wall density must be at most 100 percent, got {0}")]
    DensityOutOfRange(u8),
    /// Protected radius does not fit the signed cell coordinate range.
    #[error("protected radius {0} exceeds the cell coordinate range")]
    ProtectedRadiusTooLarge(u32),
    /// Path searches would never expand a node.
    #[error("path iteration cap must be at least one")]
    ZeroIterationCap,
    /// Agents would never be pushed out of walls.
    #[error("wall sweeps must be at least one")]
    ZeroWallSweeps,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_degenerate_lengths() {
        let config = SimulationConfig {
            cell_size: 0.0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "cell_size",
                ..
            })
        ));

        let config = SimulationConfig {
            speed: f32::NAN,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "speed", .. })
        ));
    }

    #[test]
    fn rejects_density_above_one_hundred() {
        let config = SimulationConfig {
            wall_density_percent: 101,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::DensityOutOfRange(101)));
    }

    #[test]
    fn rejects_zero_iteration_cap() {
        let config = SimulationConfig {
            path_iteration_cap: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroIterationCap));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: SimulationConfig =
            toml::from_str("wall_density_percent = 10\nspeed = 250.0\n").expect("parse toml");
        assert_eq!(config.wall_density_percent, 10);
        assert!((config.speed - 250.0).abs() < f32::EPSILON);
        assert!((config.cell_size - 100.0).abs() < f32::EPSILON);
        assert_eq!(config.relaxation_passes, 5);
        assert_eq!(config.wall_sweeps, 1);
    }

    #[test]
    fn rejects_zero_wall_sweeps() {
        let config = SimulationConfig {
            wall_sweeps: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroWallSweeps));
    }

    #[test]
    fn misspelled_keys_are_rejected() {
        let error = toml::from_str::<SimulationConfig>("relaxation_pases = 3\n")
            .expect_err("unknown key");
        assert!(error.to_string().contains("relaxation_pases"));
    }
}
