//! Update-equation coefficients.
//!
//! Coefficients are built once from the grid, the medium and the scale
//! factors, by averaging the node-sampled quantities onto the staggered
//! location of the field each equation updates:
//!
//! $$
//! \begin{aligned}
//! c^{H_r}_{E_z} &= -\frac{\Delta t}{\bar\mu^{\phi}\,\Delta\phi\,\bar h_\phi^{\phi}\,h_z}, &
//! c^{H_\phi}_{E_z} &= \frac{\Delta t}{\bar\mu^{r}\,\Delta r\,\bar h_r^{r}\,\bar h_z^{r}}, \\
//! c^{E_z}_{H_\phi} &= \frac{\Delta t}{\epsilon\,\Delta r\,h_r\,h_\phi}, &
//! c^{E_z}_{H_r} &= -\frac{\Delta t}{\epsilon\,\Delta\phi\,h_r\,h_\phi},
//! \end{aligned}
//! $$
//!
//! where $\bar{x}^{\phi}$ averages the two azimuthal neighbours (wrapping the
//! last column onto column 0) and $\bar{x}^{r}$ the two radial neighbours.
//! The self coefficients are all 1 because the medium is lossless.
//!
//! # Units of Δφ
//!
//! `delta_phi` enters in degrees, as configured, while `h_phi = r` is only the
//! arc-length scale factor for an angle in radians. The azimuthal coefficients
//! are therefore smaller than the dimensionally consistent ones by a factor of
//! 180/π. This reproduces the established reference results and is kept on
//! purpose; changing it changes every azimuthal coupling.
//!
//! # Interior indexing
//!
//! The `E_z` arrays cover only interior rows. Row `k` of every `e_z_*` array
//! belongs to grid row `k + E_Z_ROW_OFFSET`.

use ndarray::{Array2, ArrayView2};

use crate::error::{ConfigError, ConfigResult};
use crate::fields::max_abs;
use crate::grid::Grid;
use crate::medium::Medium;
use crate::scale::ScaleFactors;

/// Grid row of the first `E_z` interior row.
pub const E_Z_ROW_OFFSET: usize = 1;

/// Precomputed coefficients of the three update equations.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    pub(crate) h_r_h: Array2<f64>,
    pub(crate) h_r_e_z: Array2<f64>,
    pub(crate) h_phi_h: Array2<f64>,
    pub(crate) h_phi_e_z: Array2<f64>,
    pub(crate) e_z_e: Array2<f64>,
    pub(crate) e_z_h_phi: Array2<f64>,
    pub(crate) e_z_h_r: Array2<f64>,
    /// `(h_phi[r + 1] + h_phi[r]) / 2`, weighting the outer `H_phi` sample.
    pub(crate) e_z_h_phi_fwd: Array2<f64>,
    /// `(h_phi[r] + h_phi[r - 1]) / 2`, weighting the inner `H_phi` sample.
    pub(crate) e_z_h_phi_bwd: Array2<f64>,
}

impl Coefficients {
    /// Build every coefficient array.
    ///
    /// Fails if the medium or scale factors are not sampled on `grid`, if any
    /// of them is non-positive, or if any resulting coefficient is not finite.
    pub fn build(grid: &Grid, medium: &Medium, scale: &ScaleFactors) -> ConfigResult<Self> {
        medium.check_matches(grid)?;
        for (name, values) in [("h_r", scale.h_r()), ("h_phi", scale.h_phi()), ("h_z", scale.h_z())] {
            check_scale(name, values, grid.shape())?;
        }

        let (size_r, size_phi) = grid.shape();
        let dt = grid.delta_t();
        let dr = grid.delta_r();
        let dphi = grid.delta_phi();
        let eps = medium.epsilon();
        let mu = medium.mu();
        let h_r = scale.h_r();
        let h_phi = scale.h_phi();
        let h_z = scale.h_z();

        // H_r: integral r, half-integral phi
        let h_r_e_z = Array2::from_shape_fn((size_r, size_phi), |(r, phi)| {
            let next = (phi + 1) % size_phi;
            let mu_avg = (mu[[r, next]] + mu[[r, phi]]) / 2.0;
            let h_phi_avg = (h_phi[[r, next]] + h_phi[[r, phi]]) / 2.0;
            -dt / (mu_avg * dphi * h_phi_avg * h_z[[r, phi]])
        });

        // H_phi: half-integral r, integral phi
        let h_phi_e_z = Array2::from_shape_fn((size_r - 1, size_phi), |(r, phi)| {
            let mu_avg = (mu[[r + 1, phi]] + mu[[r, phi]]) / 2.0;
            let h_r_avg = (h_r[[r + 1, phi]] + h_r[[r, phi]]) / 2.0;
            let h_z_avg = (h_z[[r + 1, phi]] + h_z[[r, phi]]) / 2.0;
            dt / (mu_avg * dr * h_r_avg * h_z_avg)
        });

        // E_z: interior rows only
        let interior = (size_r - 2, size_phi);
        let e_z_h_phi = Array2::from_shape_fn(interior, |(k, phi)| {
            let r = k + E_Z_ROW_OFFSET;
            dt / (eps[[r, phi]] * dr * h_r[[r, phi]] * h_phi[[r, phi]])
        });
        let e_z_h_r = Array2::from_shape_fn(interior, |(k, phi)| {
            let r = k + E_Z_ROW_OFFSET;
            -dt / (eps[[r, phi]] * dphi * h_r[[r, phi]] * h_phi[[r, phi]])
        });
        let e_z_h_phi_fwd = Array2::from_shape_fn(interior, |(k, phi)| {
            let r = k + E_Z_ROW_OFFSET;
            (h_phi[[r + 1, phi]] + h_phi[[r, phi]]) / 2.0
        });
        let e_z_h_phi_bwd = Array2::from_shape_fn(interior, |(k, phi)| {
            let r = k + E_Z_ROW_OFFSET;
            (h_phi[[r, phi]] + h_phi[[r - 1, phi]]) / 2.0
        });

        let coefficients = Self {
            h_r_h: Array2::ones((size_r, size_phi)),
            h_r_e_z,
            h_phi_h: Array2::ones((size_r - 1, size_phi)),
            h_phi_e_z,
            e_z_e: Array2::ones(interior),
            e_z_h_phi,
            e_z_h_r,
            e_z_h_phi_fwd,
            e_z_h_phi_bwd,
        };
        coefficients.check_finite()?;

        log::debug!(
            "Built coefficients for {}x{} grid: |cH_r_E_z| in [{:.3e}, {:.3e}], |cH_phi_E_z| in [{:.3e}, {:.3e}]",
            size_r,
            size_phi,
            min_abs(coefficients.h_r_e_z.view()),
            max_abs(coefficients.h_r_e_z.view()),
            min_abs(coefficients.h_phi_e_z.view()),
            max_abs(coefficients.h_phi_e_z.view()),
        );

        Ok(coefficients)
    }

    fn named(&self) -> [(&'static str, &Array2<f64>); 9] {
        [
            ("cH_r_H", &self.h_r_h),
            ("cH_r_E_z", &self.h_r_e_z),
            ("cH_phi_H", &self.h_phi_h),
            ("cH_phi_E_z", &self.h_phi_e_z),
            ("cE_z_E", &self.e_z_e),
            ("cE_z_H_phi", &self.e_z_h_phi),
            ("cE_z_H_r", &self.e_z_h_r),
            ("E_z_h_phi_fwd", &self.e_z_h_phi_fwd),
            ("E_z_h_phi_bwd", &self.e_z_h_phi_bwd),
        ]
    }

    fn check_finite(&self) -> ConfigResult<()> {
        for (name, values) in self.named() {
            if let Some(((r, phi), _)) = values.indexed_iter().find(|(_, v)| !v.is_finite()) {
                return Err(ConfigError::NonFiniteCoefficient { name, r, phi });
            }
        }
        Ok(())
    }

    pub fn h_r_h(&self) -> ArrayView2<'_, f64> {
        self.h_r_h.view()
    }

    pub fn h_r_e_z(&self) -> ArrayView2<'_, f64> {
        self.h_r_e_z.view()
    }

    pub fn h_phi_h(&self) -> ArrayView2<'_, f64> {
        self.h_phi_h.view()
    }

    pub fn h_phi_e_z(&self) -> ArrayView2<'_, f64> {
        self.h_phi_e_z.view()
    }

    /// Interior rows only; see [`E_Z_ROW_OFFSET`].
    pub fn e_z_e(&self) -> ArrayView2<'_, f64> {
        self.e_z_e.view()
    }

    /// Interior rows only; see [`E_Z_ROW_OFFSET`].
    pub fn e_z_h_phi(&self) -> ArrayView2<'_, f64> {
        self.e_z_h_phi.view()
    }

    /// Interior rows only; see [`E_Z_ROW_OFFSET`].
    pub fn e_z_h_r(&self) -> ArrayView2<'_, f64> {
        self.e_z_h_r.view()
    }

    /// Interior rows only; see [`E_Z_ROW_OFFSET`].
    pub fn e_z_h_phi_fwd(&self) -> ArrayView2<'_, f64> {
        self.e_z_h_phi_fwd.view()
    }

    /// Interior rows only; see [`E_Z_ROW_OFFSET`].
    pub fn e_z_h_phi_bwd(&self) -> ArrayView2<'_, f64> {
        self.e_z_h_phi_bwd.view()
    }
}

fn check_scale(name: &'static str, values: ArrayView2<'_, f64>, shape: (usize, usize)) -> ConfigResult<()> {
    if values.dim() != shape {
        return Err(ConfigError::ShapeMismatch {
            what: name,
            expected: shape,
            found: values.dim(),
        });
    }
    for ((r, phi), &value) in values.indexed_iter() {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConfigError::NonPositiveScaleFactor { name, r, phi, value });
        }
    }
    Ok(())
}

fn min_abs(values: ArrayView2<'_, f64>) -> f64 {
    values.iter().fold(f64::INFINITY, |acc, v| acc.min(v.abs()))
}
