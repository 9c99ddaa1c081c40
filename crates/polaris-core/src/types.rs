//! Parameter types shared across the Polaris framework.
//!
//! Defaults reproduce the reference experiment: a 100 × 180 polar grid with
//! unit radial step, 2° azimuthal step, unit time step, 1000 time steps and a
//! snapshot every 5 steps.

use serde::{Deserialize, Serialize};

/// Cell counts and step sizes of the polar grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    /// Number of radial cells.
    pub size_r: usize,
    /// Number of azimuthal cells. Must satisfy `size_phi * delta_phi == 360`.
    pub size_phi: usize,
    /// Radial step.
    pub delta_r: f64,
    /// Azimuthal step in degrees.
    pub delta_phi: f64,
    /// Time step.
    pub delta_t: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            size_r: 100,
            size_phi: 180,
            delta_r: 1.0,
            delta_phi: 2.0,
            delta_t: 1.0,
        }
    }
}

/// Parameters defining a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub grid: GridSpec,
    /// The update cycle runs for step indices `1..max_time`.
    pub max_time: usize,
    /// Snapshot observers are notified when the step index is a multiple of this.
    pub snapshot_interval: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            max_time: 1000,
            snapshot_interval: 5,
        }
    }
}
