//! The three leapfrog update kernels.
//!
//! Each kernel writes one field and reads only fields it does not write, so
//! rows are dispatched through the [`ComputeBackend`] in any order. Azimuthal
//! neighbours wrap modulo `size_phi`; radial neighbours never wrap.

use ndarray::{s, Array2};
use polaris_compute::ComputeBackend;

use super::coefficients::{Coefficients, E_Z_ROW_OFFSET};

/// Next azimuthal column, wrapping the last column onto column 0.
#[inline]
pub(crate) fn next_phi(phi: usize, size_phi: usize) -> usize {
    (phi + 1) % size_phi
}

/// Previous azimuthal column, wrapping column 0 onto the last column.
#[inline]
pub(crate) fn prev_phi(phi: usize, size_phi: usize) -> usize {
    (phi + size_phi - 1) % size_phi
}

/// `H_r ← cH_r_H·H_r + cH_r_E_z·(E_z[r, φ+1] − E_z[r, φ])` on every row.
pub(crate) fn update_h_r(
    backend: &dyn ComputeBackend,
    c: &Coefficients,
    e_z: &Array2<f64>,
    h_r: &mut Array2<f64>,
) {
    let size_phi = e_z.ncols();
    backend.for_each_row(h_r.view_mut(), &|r, mut row| {
        let e = e_z.row(r);
        let c_h = c.h_r_h.row(r);
        let c_e = c.h_r_e_z.row(r);
        for phi in 0..size_phi {
            let next = next_phi(phi, size_phi);
            row[phi] = c_h[phi] * row[phi] + c_e[phi] * (e[next] - e[phi]);
        }
    });
}

/// `H_phi ← cH_phi_H·H_phi + cH_phi_E_z·(E_z[r+1, φ] − E_z[r, φ])` on rows `0..size_r-1`.
pub(crate) fn update_h_phi(
    backend: &dyn ComputeBackend,
    c: &Coefficients,
    e_z: &Array2<f64>,
    h_phi: &mut Array2<f64>,
) {
    let size_phi = e_z.ncols();
    backend.for_each_row(h_phi.view_mut(), &|r, mut row| {
        let inner = e_z.row(r);
        let outer = e_z.row(r + 1);
        let c_h = c.h_phi_h.row(r);
        let c_e = c.h_phi_e_z.row(r);
        for phi in 0..size_phi {
            row[phi] = c_h[phi] * row[phi] + c_e[phi] * (outer[phi] - inner[phi]);
        }
    });
}

/// `E_z` update on interior rows `1..size_r-1`:
///
/// `E_z ← cE_z_E·E_z + cE_z_H_phi·(fwd·H_phi[r, φ] − bwd·H_phi[r−1, φ]) + cE_z_H_r·(H_r[r, φ] − H_r[r, φ−1])`
///
/// Rows `0` and `size_r − 1` are left untouched.
pub(crate) fn update_e_z(
    backend: &dyn ComputeBackend,
    c: &Coefficients,
    h_r: &Array2<f64>,
    h_phi: &Array2<f64>,
    e_z: &mut Array2<f64>,
) {
    let (size_r, size_phi) = e_z.dim();
    let interior = e_z.slice_mut(s![E_Z_ROW_OFFSET..size_r - 1, ..]);
    backend.for_each_row(interior, &|k, mut row| {
        let r = k + E_Z_ROW_OFFSET;
        let h_phi_outer = h_phi.row(r);
        let h_phi_inner = h_phi.row(r - 1);
        let h_r_row = h_r.row(r);
        let c_e = c.e_z_e.row(k);
        let c_h_phi = c.e_z_h_phi.row(k);
        let c_h_r = c.e_z_h_r.row(k);
        let fwd = c.e_z_h_phi_fwd.row(k);
        let bwd = c.e_z_h_phi_bwd.row(k);
        for phi in 0..size_phi {
            let prev = prev_phi(phi, size_phi);
            row[phi] = c_e[phi] * row[phi]
                + c_h_phi[phi] * (fwd[phi] * h_phi_outer[phi] - bwd[phi] * h_phi_inner[phi])
                + c_h_r[phi] * (h_r_row[phi] - h_r_row[prev]);
        }
    });
}
