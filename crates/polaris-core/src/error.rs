//! Construction-time errors.
//!
//! Every failure mode of the solver is detected while building the grid,
//! medium, coefficients, or source. Once a [`TimeStepper`](crate::solver::fdtd::TimeStepper)
//! exists, stepping cannot fail.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Step size `{name}` must be positive and finite, got {value}")]
    NonPositiveStep { name: &'static str, value: f64 },

    #[error("{size_phi} azimuthal cells of {delta_phi}° do not tile 360°")]
    AzimuthNotTiling { size_phi: usize, delta_phi: f64 },

    #[error("Grid needs at least 3 radial cells and 1 azimuthal cell, got {size_r}x{size_phi}")]
    GridTooSmall { size_r: usize, size_phi: usize },

    #[error("{what} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("{quantity} must be positive and finite at (r={r}, phi={phi}), got {value}")]
    NonPositiveMedium {
        quantity: &'static str,
        r: usize,
        phi: usize,
        value: f64,
    },

    #[error("Scale factor {name} must be positive and finite at (r={r}, phi={phi}), got {value}")]
    NonPositiveScaleFactor {
        name: &'static str,
        r: usize,
        phi: usize,
        value: f64,
    },

    #[error("Coefficient {name} is not finite at (r={r}, phi={phi})")]
    NonFiniteCoefficient { name: &'static str, r: usize, phi: usize },

    #[error("Source cell (r={r}, phi={phi}) lies outside the {size_r}x{size_phi} grid")]
    SourceOutOfBounds {
        r: usize,
        phi: usize,
        size_r: usize,
        size_phi: usize,
    },

    #[error("Source parameter `{name}` is invalid: {value}")]
    InvalidSourceParameter { name: &'static str, value: f64 },

    #[error("Invalid medium region: {0}")]
    InvalidRegion(String),

    #[error("Snapshot interval must be at least 1")]
    InvalidSnapshotInterval,
}

pub type ConfigResult<T> = Result<T, ConfigError>;
