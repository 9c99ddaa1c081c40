//! # Polaris Core
//!
//! Finite-difference time-domain simulation of a 2-D transverse-magnetic wave
//! (`E_z`, `H_r`, `H_phi`) on a cylindrical-polar grid. The domain is
//! periodic in azimuth and truncated radially by fixed `E_z` rows at the axis
//! and the outer edge.
//!
//! ## Architecture
//!
//! A [`solver::fdtd::TimeStepper`] is built once from [`types::SimulationParams`],
//! a [`medium::Medium`] and a [`source::Source`]. Construction validates the
//! configuration and precomputes every update coefficient; stepping itself
//! cannot fail. Results leave the stepper through the
//! [`solver::SnapshotObserver`] trait at a fixed cadence.
//!
//! ## Modules
//!
//! - [`types`] — Grid and run parameters.
//! - [`grid`] — Grid geometry and polar-to-Cartesian mapping.
//! - [`medium`] — Permittivity and permeability maps.
//! - [`scale`] — Metric scale factors of the coordinate system.
//! - [`fields`] — Field storage, staggering and diagnostics.
//! - [`source`] — Excitation profiles and injection.
//! - [`solver`] — Leapfrog time stepping and the snapshot interface.
//! - [`error`] — Configuration errors.

pub mod error;
pub mod fields;
pub mod grid;
pub mod medium;
pub mod scale;
pub mod solver;
pub mod source;
pub mod types;

pub use error::{ConfigError, ConfigResult};
pub use fields::{FieldPeaks, FieldState};
pub use grid::{CartesianGrid, Grid};
pub use medium::{Medium, SectorRegion};
pub use solver::fdtd::{RunSummary, TimeStepper};
pub use solver::{Snapshot, SnapshotObserver};
pub use source::{InjectionMode, ProfileSpec, Source, SourceLocation, SourceProfile, SourceSpec};
pub use types::{GridSpec, SimulationParams};
