//! Time-domain solver and its snapshot interface.
//!
//! The [`fdtd::TimeStepper`] owns all simulation state. Consumers observe it
//! through the [`SnapshotObserver`] trait, which receives a read-only
//! [`Snapshot`] at every cadence tick. Rendering and export live outside this
//! crate and implement the trait.

pub mod fdtd;

use ndarray::ArrayView2;

use crate::fields::FieldPeaks;
use crate::grid::CartesianGrid;

/// Read-only view of the field state after a completed time step.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    /// Step index that has just completed.
    pub step: usize,
    /// `step * delta_t`.
    pub time: f64,
    pub e_z: ArrayView2<'a, f64>,
    pub h_r: ArrayView2<'a, f64>,
    pub h_phi: ArrayView2<'a, f64>,
    /// Cartesian coordinates of the `E_z` nodes.
    pub coordinates: &'a CartesianGrid,
}

impl Snapshot<'_> {
    pub fn peaks(&self) -> FieldPeaks {
        FieldPeaks::of(self.e_z, self.h_r, self.h_phi)
    }
}

/// Receives snapshots during a run.
///
/// The stepper does not advance until `on_snapshot` returns.
pub trait SnapshotObserver {
    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>);
}

impl<F> SnapshotObserver for F
where
    F: FnMut(&Snapshot<'_>),
{
    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) {
        self(snapshot)
    }
}
