//! Leapfrog FDTD time stepping on the polar grid.
//!
//! One cycle advances the step index `t` by one and then, strictly in order:
//!
//! 1. updates `H_r` from the azimuthal difference of `E_z`,
//! 2. updates `H_phi` from the radial difference of `E_z`,
//! 3. updates interior `E_z` from the freshly updated `H_r` and `H_phi`,
//! 4. applies the source for step `t`.
//!
//! A run executes cycles for `t = 1 .. max_time - 1` and notifies the observer
//! whenever `t` is a multiple of the snapshot interval. The outermost and
//! innermost `E_z` rows are never updated, which truncates the domain with a
//! fixed (reflecting) boundary.
//!
//! The scheme is conditionally stable. With the default unit steps the
//! azimuthal coupling near the axis exceeds the CFL limit and the fields grow
//! without bound once the pulse reaches the first interior ring; see
//! [`Grid::courant_estimate`](crate::grid::Grid::courant_estimate). No guard
//! is applied.

pub mod coefficients;
pub mod update;

use std::sync::Arc;

use ndarray::ArrayView2;
use polaris_compute::{ComputeBackend, SerialBackend};
use serde::{Deserialize, Serialize};

use self::coefficients::Coefficients;
use crate::error::{ConfigError, ConfigResult};
use crate::fields::{FieldPeaks, FieldState};
use crate::grid::{CartesianGrid, Grid};
use crate::medium::Medium;
use crate::scale::ScaleFactors;
use crate::solver::{Snapshot, SnapshotObserver};
use crate::source::Source;
use crate::types::SimulationParams;

/// Owns the grid, medium, coefficients, fields and source of one simulation.
pub struct TimeStepper {
    grid: Grid,
    medium: Medium,
    coefficients: Coefficients,
    fields: FieldState,
    source: Source,
    coordinates: CartesianGrid,
    backend: Arc<dyn ComputeBackend>,
    max_time: usize,
    snapshot_interval: usize,
    /// Index of the last completed step; 0 before the first.
    current: usize,
}

/// Outcome of [`TimeStepper::run`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of cycles executed by this call.
    pub steps: usize,
    /// Number of observer notifications.
    pub snapshots: usize,
    pub final_step: usize,
    /// Largest magnitude of each component over every step of the run; NaN
    /// once a component has gone NaN.
    pub peak: FieldPeaks,
    /// Field energy after the last step.
    pub final_energy: f64,
    /// Whether the final fields are free of NaN and infinity.
    pub finite: bool,
}

impl TimeStepper {
    /// Validate the configuration and precompute everything the update loop needs.
    ///
    /// All configuration errors surface here; stepping itself cannot fail.
    pub fn new(params: &SimulationParams, medium: Medium, source: Source) -> ConfigResult<Self> {
        let grid = Grid::new(params.grid.clone())?;
        if params.snapshot_interval == 0 {
            return Err(ConfigError::InvalidSnapshotInterval);
        }
        source.check_fits(&grid)?;

        let scale = ScaleFactors::cylindrical(&grid);
        let coefficients = Coefficients::build(&grid, &medium, &scale)?;
        let fields = FieldState::zeros(&grid);
        let coordinates = grid.cartesian_grid();

        log::info!(
            "FDTD setup: {}x{} cells, dr={}, dphi={}°, dt={}, {} steps, source {:?}",
            grid.size_r(),
            grid.size_phi(),
            grid.delta_r(),
            grid.delta_phi(),
            grid.delta_t(),
            params.max_time.saturating_sub(1),
            source,
        );

        Ok(Self {
            grid,
            medium,
            coefficients,
            fields,
            source,
            coordinates,
            backend: Arc::new(SerialBackend),
            max_time: params.max_time,
            snapshot_interval: params.snapshot_interval,
            current: 0,
        })
    }

    /// Replace the compute backend used for the field updates.
    pub fn with_backend(mut self, backend: Arc<dyn ComputeBackend>) -> Self {
        log::debug!("Compute backend: {}", backend.device_info().name);
        self.backend = backend;
        self
    }

    /// Advance one full cycle.
    pub fn step(&mut self) {
        self.current += 1;
        let backend = self.backend.as_ref();
        let fields = &mut self.fields;
        update::update_h_r(backend, &self.coefficients, &fields.e_z, &mut fields.h_r);
        update::update_h_phi(backend, &self.coefficients, &fields.e_z, &mut fields.h_phi);
        update::update_e_z(
            backend,
            &self.coefficients,
            &fields.h_r,
            &fields.h_phi,
            &mut fields.e_z,
        );
        self.source.inject(&mut fields.e_z, self.current);
    }

    /// Run the remaining cycles up to `max_time - 1`, notifying `observer` on
    /// every cadence tick.
    pub fn run(&mut self, observer: &mut dyn SnapshotObserver) -> RunSummary {
        let start = self.current;
        let mut peak = self.fields.peaks();
        let mut snapshots = 0;

        while self.current + 1 < self.max_time {
            self.step();
            peak = peak.max(self.fields.peaks());
            if self.current % self.snapshot_interval == 0 {
                log::trace!("Snapshot at step {}", self.current);
                observer.on_snapshot(&self.snapshot());
                snapshots += 1;
            }
        }

        let summary = RunSummary {
            steps: self.current - start,
            snapshots,
            final_step: self.current,
            peak,
            final_energy: self.fields.energy(&self.grid, &self.medium),
            finite: self.fields.is_finite(),
        };
        log::info!(
            "Run finished at step {}: peak |E_z|={:.3e}, {} snapshots",
            summary.final_step,
            summary.peak.e_z,
            summary.snapshots
        );
        summary
    }

    /// Zero the fields and rewind to step 0.
    pub fn reset(&mut self) {
        self.fields.clear();
        self.current = 0;
    }

    /// Read-only view of the current state.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            step: self.current,
            time: self.current as f64 * self.grid.delta_t(),
            e_z: self.fields.e_z(),
            h_r: self.fields.h_r(),
            h_phi: self.fields.h_phi(),
            coordinates: &self.coordinates,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn medium(&self) -> &Medium {
        &self.medium
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    pub fn fields(&self) -> &FieldState {
        &self.fields
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn coordinates(&self) -> &CartesianGrid {
        &self.coordinates
    }

    pub fn e_z(&self) -> ArrayView2<'_, f64> {
        self.fields.e_z()
    }

    pub fn h_r(&self) -> ArrayView2<'_, f64> {
        self.fields.h_r()
    }

    pub fn h_phi(&self) -> ArrayView2<'_, f64> {
        self.fields.h_phi()
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn max_time(&self) -> usize {
        self.max_time
    }

    pub fn snapshot_interval(&self) -> usize {
        self.snapshot_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{GaussianPulse, InjectionMode, SourceLocation};
    use crate::types::GridSpec;

    fn params(size_r: usize, max_time: usize) -> SimulationParams {
        SimulationParams {
            grid: GridSpec { size_r, ..Default::default() },
            max_time,
            snapshot_interval: 5,
        }
    }

    fn stepper(params: &SimulationParams, source: Source) -> TimeStepper {
        let grid = Grid::new(params.grid.clone()).unwrap();
        TimeStepper::new(params, Medium::vacuum(&grid), source).unwrap()
    }

    #[test]
    fn test_run_executes_max_time_minus_one_cycles() {
        let params = params(20, 23);
        let mut s = stepper(&params, Source::point(10, 90, |_: usize| 0.0));
        let mut seen = Vec::new();
        let summary = s.run(&mut |snap: &Snapshot<'_>| seen.push(snap.step));

        assert_eq!(summary.steps, 22);
        assert_eq!(summary.final_step, 22);
        assert_eq!(seen, vec![5, 10, 15, 20]);
        assert_eq!(summary.snapshots, 4);

        // Nothing left to do
        let again = s.run(&mut |_: &Snapshot<'_>| panic!("no more snapshots expected"));
        assert_eq!(again.steps, 0);
    }

    #[test]
    fn test_snapshot_reports_time_and_coordinates() {
        let mut p = params(20, 11);
        p.grid.delta_t = 0.5;
        let mut s = stepper(&p, Source::point(10, 90, GaussianPulse::default()));
        let mut times = Vec::new();
        s.run(&mut |snap: &Snapshot<'_>| {
            assert_eq!(snap.coordinates.x.dim(), snap.e_z.dim());
            times.push(snap.time);
        });
        assert_eq!(times, vec![2.5, 5.0]);
    }

    #[test]
    fn test_reset_rewinds() {
        let params = params(20, 50);
        let mut s = stepper(&params, Source::point(10, 0, |_: usize| 1.0));
        for _ in 0..10 {
            s.step();
        }
        assert_eq!(s.current_step(), 10);
        assert!(s.fields().peaks().e_z > 0.0);

        s.reset();
        assert_eq!(s.current_step(), 0);
        assert_eq!(*s.fields(), FieldState::zeros(s.grid()));
    }

    #[test]
    fn test_hard_ring_source_drives_axis_row() {
        let params = params(20, 50);
        let source =
            Source::new(SourceLocation::Ring { r: 0 }, |t: usize| t as f64).with_mode(InjectionMode::Hard);
        let mut s = stepper(&params, source);
        for _ in 0..3 {
            s.step();
        }
        assert!(s.e_z().row(0).iter().all(|&v| v == 3.0));
    }

    #[test]
    fn test_construction_errors() {
        let grid = Grid::default();
        let mut bad = SimulationParams::default();
        bad.snapshot_interval = 0;
        assert_eq!(
            TimeStepper::new(&bad, Medium::vacuum(&grid), Source::default()).err(),
            Some(ConfigError::InvalidSnapshotInterval)
        );

        let mut bad = SimulationParams::default();
        bad.grid.size_phi = 100;
        assert!(matches!(
            TimeStepper::new(&bad, Medium::vacuum(&grid), Source::default()),
            Err(ConfigError::AzimuthNotTiling { .. })
        ));

        let small = params(20, 10);
        assert!(matches!(
            TimeStepper::new(&small, Medium::vacuum(&grid), Source::point(5, 5, |_: usize| 0.0)),
            Err(ConfigError::ShapeMismatch { .. })
        ));
        let small_grid = Grid::new(small.grid.clone()).unwrap();
        assert!(matches!(
            TimeStepper::new(&small, Medium::vacuum(&small_grid), Source::default()),
            Err(ConfigError::SourceOutOfBounds { .. })
        ));
    }
}
