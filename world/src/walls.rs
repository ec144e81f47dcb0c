//! Procedural wall field covering the unbounded grid.

use gridswarm_core::{CellCoord, SimulationConfig};

const X_MULTIPLIER: i64 = 374_761_393;
const Y_MULTIPLIER: i64 = 668_265_263;
const AVALANCHE_MULTIPLIER: i64 = 1_274_126_177;

/// Pure obstacle oracle over integer grid coordinates.
///
/// The map stores no cells. Classification is recomputed from the coordinate
/// pair on every query through a fixed integer hash, so the same cell always
/// reports the same state for the lifetime of the process and across runs.
/// Cells inside the protected Chebyshev radius around the origin are always
/// open, which keeps a safe spawn area regardless of density.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallMap {
    density_percent: u8,
    protected_radius: u32,
}

impl WallMap {
    /// Creates a wall map with the provided density and protected radius.
    #[must_use]
    pub const fn new(density_percent: u8, protected_radius: u32) -> Self {
        Self {
            density_percent,
            protected_radius,
        }
    }

    /// Builds the wall map described by the simulation configuration.
    #[must_use]
    pub const fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.wall_density_percent, config.protected_radius)
    }

    /// Configured wall density in percent.
    #[must_use]
    pub const fn density_percent(&self) -> u8 {
        self.density_percent
    }

    /// Reports whether the cell lies inside the always-open region.
    #[must_use]
    pub fn is_protected(&self, cell: CellCoord) -> bool {
        cell.x().unsigned_abs() <= self.protected_radius
            && cell.y().unsigned_abs() <= self.protected_radius
    }

    /// Reports whether the cell is a wall.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        if self.is_protected(cell) {
            return false;
        }
        mix(cell) < self.density_percent
    }

    /// Enumerates wall cells inside the inclusive rectangle spanned by `min`
    /// and `max`, row by row.
    pub fn walls_in(
        &self,
        min: CellCoord,
        max: CellCoord,
    ) -> impl Iterator<Item = CellCoord> + '_ {
        (min.y()..=max.y())
            .flat_map(move |y| (min.x()..=max.x()).map(move |x| CellCoord::new(x, y)))
            .filter(move |cell| self.is_wall(*cell))
    }
}

/// Scrambles the coordinate pair into a value in `0..100`.
fn mix(cell: CellCoord) -> u8 {
    let mut n = i64::from(cell.x())
        .wrapping_mul(X_MULTIPLIER)
        .wrapping_add(i64::from(cell.y()).wrapping_mul(Y_MULTIPLIER));
    n = (n ^ (n >> 13)).wrapping_mul(AVALANCHE_MULTIPLIER);
    (n ^ (n >> 16)).rem_euclid(100) as u8
}
