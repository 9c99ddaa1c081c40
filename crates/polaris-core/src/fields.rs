//! The evolving field state and its diagnostics.
//!
//! # Staggering
//!
//! | Field   | Shape                      | Row `i` radius      | Column `j` azimuth       |
//! |---------|----------------------------|---------------------|--------------------------|
//! | `E_z`   | `size_r × size_phi`        | `i · Δr`            | `j · Δφ`                 |
//! | `H_r`   | `size_r × size_phi`        | `i · Δr`            | `(j + ½) · Δφ`           |
//! | `H_phi` | `(size_r − 1) × size_phi`  | `(i + ½) · Δr`      | `j · Δφ`                 |
//!
//! All three are periodic in `j` with period `size_phi`.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::medium::Medium;

/// Row offset of `H_phi` relative to `E_z`: `H_phi[i]` sits at radius `(i + ½) · Δr`.
pub const H_PHI_RADIAL_OFFSET: f64 = 0.5;

/// `E_z`, `H_r` and `H_phi` on their staggered locations.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldState {
    pub(crate) e_z: Array2<f64>,
    pub(crate) h_r: Array2<f64>,
    pub(crate) h_phi: Array2<f64>,
}

impl FieldState {
    /// All-zero fields sized for `grid`.
    pub fn zeros(grid: &Grid) -> Self {
        let (size_r, size_phi) = grid.shape();
        Self {
            e_z: Array2::zeros((size_r, size_phi)),
            h_r: Array2::zeros((size_r, size_phi)),
            h_phi: Array2::zeros((size_r - 1, size_phi)),
        }
    }

    pub fn e_z(&self) -> ArrayView2<'_, f64> {
        self.e_z.view()
    }

    pub fn h_r(&self) -> ArrayView2<'_, f64> {
        self.h_r.view()
    }

    pub fn h_phi(&self) -> ArrayView2<'_, f64> {
        self.h_phi.view()
    }

    /// Zero every field in place.
    pub(crate) fn clear(&mut self) {
        self.e_z.fill(0.0);
        self.h_r.fill(0.0);
        self.h_phi.fill(0.0);
    }

    /// Largest absolute value of each component.
    pub fn peaks(&self) -> FieldPeaks {
        FieldPeaks::of(self.e_z.view(), self.h_r.view(), self.h_phi.view())
    }

    /// Whether every sample of every component is finite.
    pub fn is_finite(&self) -> bool {
        self.e_z
            .iter()
            .chain(self.h_r.iter())
            .chain(self.h_phi.iter())
            .all(|v| v.is_finite())
    }

    /// Discrete electromagnetic energy per unit length in z,
    /// $\frac{1}{2}\sum (\epsilon E_z^2 + \mu H_r^2 + \mu H_\phi^2)\, r\,\Delta r\,\Delta\phi$.
    ///
    /// Each component is weighted by the area of the cell around its own
    /// storage location; `H_phi` uses the permeability of the row below it.
    /// The axis row carries no area and drops out.
    pub fn energy(&self, grid: &Grid, medium: &Medium) -> f64 {
        let dphi = grid.delta_phi().to_radians();
        let cell = |radius: f64| radius * grid.delta_r() * dphi;
        let eps = medium.epsilon();
        let mu = medium.mu();

        let mut total = 0.0;
        for ((r, phi), &e) in self.e_z.indexed_iter() {
            let h = self.h_r[[r, phi]];
            total += (eps[[r, phi]] * e * e + mu[[r, phi]] * h * h) * cell(grid.radius(r));
        }
        for ((r, phi), &h) in self.h_phi.indexed_iter() {
            let radius = grid.radius(r) + H_PHI_RADIAL_OFFSET * grid.delta_r();
            total += mu[[r, phi]] * h * h * cell(radius);
        }
        0.5 * total
    }
}

/// Peak absolute value of each field component.
///
/// A NaN anywhere in a component makes its peak NaN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldPeaks {
    pub e_z: f64,
    pub h_r: f64,
    pub h_phi: f64,
}

impl FieldPeaks {
    pub fn of(e_z: ArrayView2<'_, f64>, h_r: ArrayView2<'_, f64>, h_phi: ArrayView2<'_, f64>) -> Self {
        Self {
            e_z: max_abs(e_z),
            h_r: max_abs(h_r),
            h_phi: max_abs(h_phi),
        }
    }

    /// Component-wise maximum, NaN-propagating.
    pub fn max(self, other: Self) -> Self {
        Self {
            e_z: nan_max(self.e_z, other.e_z),
            h_r: nan_max(self.h_r, other.h_r),
            h_phi: nan_max(self.h_phi, other.h_phi),
        }
    }
}

fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// Largest absolute value in `values`, or NaN if any value is NaN.
pub(crate) fn max_abs(values: ArrayView2<'_, f64>) -> f64 {
    values.iter().fold(0.0, |acc, v| nan_max(acc, v.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shapes_follow_staggering() {
        let grid = Grid::default();
        let fields = FieldState::zeros(&grid);
        assert_eq!(fields.e_z().dim(), (100, 180));
        assert_eq!(fields.h_r().dim(), (100, 180));
        assert_eq!(fields.h_phi().dim(), (99, 180));
    }

    #[test]
    fn test_peaks_and_clear() {
        let grid = Grid::default();
        let mut fields = FieldState::zeros(&grid);
        fields.e_z[[3, 4]] = -2.5;
        fields.h_r[[7, 0]] = 0.5;
        fields.h_phi[[98, 179]] = 1.25;

        let peaks = fields.peaks();
        assert_eq!(peaks, FieldPeaks { e_z: 2.5, h_r: 0.5, h_phi: 1.25 });

        fields.clear();
        assert_eq!(fields.peaks(), FieldPeaks::default());
        assert_eq!(fields, FieldState::zeros(&grid));
    }

    #[test]
    fn test_energy_of_single_cell() {
        let grid = Grid::default();
        let medium = Medium::uniform(&grid, 2.0, 1.0).unwrap();
        let mut fields = FieldState::zeros(&grid);
        assert_eq!(fields.energy(&grid, &medium), 0.0);

        fields.e_z[[10, 0]] = 3.0;
        let expected = 0.5 * 2.0 * 9.0 * 10.0 * 1.0 * 2.0_f64.to_radians();
        assert_relative_eq!(fields.energy(&grid, &medium), expected, max_relative = 1e-12);

        // The axis row has zero area
        fields.e_z[[0, 5]] = 100.0;
        assert_relative_eq!(fields.energy(&grid, &medium), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_non_finite_detected() {
        let grid = Grid::default();
        let mut fields = FieldState::zeros(&grid);
        assert!(fields.is_finite());
        fields.h_phi[[0, 0]] = f64::NAN;
        assert!(!fields.is_finite());
    }

    #[test]
    fn test_peaks_propagate_nan() {
        let grid = Grid::default();
        let mut fields = FieldState::zeros(&grid);
        fields.e_z[[5, 5]] = 3.0;
        fields.e_z[[6, 5]] = f64::NAN;
        fields.h_r[[1, 1]] = -2.0;

        let peaks = fields.peaks();
        assert!(peaks.e_z.is_nan());
        assert_eq!(peaks.h_r, 2.0);

        let clean = FieldPeaks { e_z: 10.0, h_r: 1.0, h_phi: 0.0 };
        let merged = clean.max(peaks);
        assert!(merged.e_z.is_nan());
        assert_eq!(merged.h_r, 2.0);
        assert!(peaks.max(clean).e_z.is_nan());
    }
}
