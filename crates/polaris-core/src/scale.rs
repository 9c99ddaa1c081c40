//! Metric scale factors of cylindrical coordinates.
//!
//! Scale factors are sampled at integral `(r, phi)` nodes. None of the three
//! field components lives exactly on those nodes, so the coefficient builder
//! averages neighbouring samples onto each field's staggered location.

use ndarray::{Array2, ArrayView2};

use crate::grid::Grid;

/// `h_r`, `h_phi` and `h_z` on every grid node.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleFactors {
    h_r: Array2<f64>,
    h_phi: Array2<f64>,
    h_z: Array2<f64>,
}

impl ScaleFactors {
    /// Cylindrical scale factors: `h_r = 1`, `h_phi = r`, `h_z = 1`.
    ///
    /// The axis row uses [`AXIS_RADIUS`](crate::grid::AXIS_RADIUS) for `h_phi`
    /// so that the azimuthal coefficients of row 0 stay finite.
    pub fn cylindrical(grid: &Grid) -> Self {
        let shape = grid.shape();
        Self {
            h_r: Array2::ones(shape),
            h_phi: Array2::from_shape_fn(shape, |(r, _)| grid.regularised_radius(r)),
            h_z: Array2::ones(shape),
        }
    }

    /// Scale factors from explicit arrays; all three must share one shape.
    ///
    /// Values are validated when coefficients are built.
    pub fn from_arrays(h_r: Array2<f64>, h_phi: Array2<f64>, h_z: Array2<f64>) -> Self {
        Self { h_r, h_phi, h_z }
    }

    pub fn h_r(&self) -> ArrayView2<'_, f64> {
        self.h_r.view()
    }

    pub fn h_phi(&self) -> ArrayView2<'_, f64> {
        self.h_phi.view()
    }

    pub fn h_z(&self) -> ArrayView2<'_, f64> {
        self.h_z.view()
    }
}
