//! Per-cell permittivity and permeability.
//!
//! Both arrays are aligned with the `E_z` nodes and must be strictly positive
//! and finite everywhere. Conductivity is not modelled.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::grid::Grid;

/// Relative permittivity and permeability sampled on the grid nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Medium {
    epsilon: Array2<f64>,
    mu: Array2<f64>,
}

impl Medium {
    /// Uniform vacuum (`epsilon = mu = 1`).
    pub fn vacuum(grid: &Grid) -> Self {
        Self {
            epsilon: Array2::ones(grid.shape()),
            mu: Array2::ones(grid.shape()),
        }
    }

    /// Uniform medium with the given constants.
    pub fn uniform(grid: &Grid, epsilon: f64, mu: f64) -> ConfigResult<Self> {
        Self::from_arrays(
            Array2::from_elem(grid.shape(), epsilon),
            Array2::from_elem(grid.shape(), mu),
        )
    }

    /// Build a medium from explicit arrays of equal shape.
    pub fn from_arrays(epsilon: Array2<f64>, mu: Array2<f64>) -> ConfigResult<Self> {
        if epsilon.dim() != mu.dim() {
            return Err(ConfigError::ShapeMismatch {
                what: "mu",
                expected: epsilon.dim(),
                found: mu.dim(),
            });
        }
        check_positive("epsilon", epsilon.view())?;
        check_positive("mu", mu.view())?;
        Ok(Self { epsilon, mu })
    }

    /// Overwrite the constants inside an annular sector.
    pub fn fill_sector(&mut self, region: &SectorRegion) -> ConfigResult<()> {
        let (size_r, size_phi) = self.epsilon.dim();
        region.validate(size_r, size_phi)?;

        let phi_cells = region.phi_cells.unwrap_or(size_phi);
        for r in region.r_start..region.r_end {
            for k in 0..phi_cells {
                let phi = (region.phi_start + k) % size_phi;
                self.epsilon[[r, phi]] = region.epsilon;
                self.mu[[r, phi]] = region.mu;
            }
        }
        Ok(())
    }

    pub fn epsilon(&self) -> ArrayView2<'_, f64> {
        self.epsilon.view()
    }

    pub fn mu(&self) -> ArrayView2<'_, f64> {
        self.mu.view()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.epsilon.dim()
    }

    /// Fastest phase velocity in the medium, `1 / sqrt(min(epsilon * mu))`.
    pub fn max_wave_speed(&self) -> f64 {
        let min_index = self
            .epsilon
            .iter()
            .zip(self.mu.iter())
            .map(|(e, m)| e * m)
            .fold(f64::INFINITY, f64::min);
        1.0 / min_index.sqrt()
    }

    /// Check that the medium is sampled on `grid`.
    pub fn check_matches(&self, grid: &Grid) -> ConfigResult<()> {
        if self.shape() != grid.shape() {
            return Err(ConfigError::ShapeMismatch {
                what: "medium",
                expected: grid.shape(),
                found: self.shape(),
            });
        }
        Ok(())
    }
}

fn check_positive(quantity: &'static str, values: ArrayView2<'_, f64>) -> ConfigResult<()> {
    for ((r, phi), &value) in values.indexed_iter() {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConfigError::NonPositiveMedium { quantity, r, phi, value });
        }
    }
    Ok(())
}

/// An annular sector of the grid filled with its own material.
///
/// Rows `r_start..r_end` and `phi_cells` columns starting at `phi_start`,
/// wrapping past the last column back to column 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRegion {
    pub r_start: usize,
    pub r_end: usize,
    #[serde(default)]
    pub phi_start: usize,
    /// Number of azimuthal cells covered; `None` covers the full ring.
    #[serde(default)]
    pub phi_cells: Option<usize>,
    #[serde(default = "default_constant")]
    pub epsilon: f64,
    #[serde(default = "default_constant")]
    pub mu: f64,
}

fn default_constant() -> f64 {
    1.0
}

impl SectorRegion {
    /// A full ring covering rows `r_start..r_end`.
    pub fn ring(r_start: usize, r_end: usize, epsilon: f64, mu: f64) -> Self {
        Self {
            r_start,
            r_end,
            phi_start: 0,
            phi_cells: None,
            epsilon,
            mu,
        }
    }

    fn validate(&self, size_r: usize, size_phi: usize) -> ConfigResult<()> {
        if self.r_start >= self.r_end || self.r_end > size_r {
            return Err(ConfigError::InvalidRegion(format!(
                "radial range {}..{} is empty or exceeds {} rows",
                self.r_start, self.r_end, size_r
            )));
        }
        if self.phi_start >= size_phi {
            return Err(ConfigError::InvalidRegion(format!(
                "phi_start {} exceeds {} columns",
                self.phi_start, size_phi
            )));
        }
        let cells = self.phi_cells.unwrap_or(size_phi);
        if cells == 0 || cells > size_phi {
            return Err(ConfigError::InvalidRegion(format!(
                "phi_cells must be in 1..={size_phi}, got {cells}"
            )));
        }
        for (quantity, value) in [("epsilon", self.epsilon), ("mu", self.mu)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositiveMedium {
                    quantity,
                    r: self.r_start,
                    phi: self.phi_start,
                    value,
                });
            }
        }
        Ok(())
    }
}
