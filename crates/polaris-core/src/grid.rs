//! Polar grid geometry and the mapping to Cartesian coordinates.
//!
//! Grid nodes are addressed by `(r, phi)` indices. The radius of row `r` is
//! `r * delta_r` and the azimuth of column `phi` is `phi * delta_phi` degrees.
//! The azimuth is periodic: column `size_phi` is column `0`.

use ndarray::Array2;

use crate::error::{ConfigError, ConfigResult};
use crate::types::GridSpec;

/// Radius substituted for the `r = 0` row wherever a strictly positive radius
/// is required (coordinate output and the azimuthal scale factor).
pub const AXIS_RADIUS: f64 = 1e-6;

/// Relative tolerance when checking that the azimuthal cells tile 360°.
const TILING_TOLERANCE: f64 = 1e-9;

/// A validated polar grid. The default is the 100 × 180 reference grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    spec: GridSpec,
}

impl Grid {
    /// Validate `spec` and build the grid.
    pub fn new(spec: GridSpec) -> ConfigResult<Self> {
        for (name, value) in [
            ("delta_r", spec.delta_r),
            ("delta_phi", spec.delta_phi),
            ("delta_t", spec.delta_t),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositiveStep { name, value });
            }
        }

        if spec.size_r < 3 || spec.size_phi == 0 {
            return Err(ConfigError::GridTooSmall {
                size_r: spec.size_r,
                size_phi: spec.size_phi,
            });
        }

        let span = spec.size_phi as f64 * spec.delta_phi;
        if (span - 360.0).abs() > TILING_TOLERANCE * 360.0 {
            return Err(ConfigError::AzimuthNotTiling {
                size_phi: spec.size_phi,
                delta_phi: spec.delta_phi,
            });
        }

        Ok(Self { spec })
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn size_r(&self) -> usize {
        self.spec.size_r
    }

    pub fn size_phi(&self) -> usize {
        self.spec.size_phi
    }

    pub fn delta_r(&self) -> f64 {
        self.spec.delta_r
    }

    /// Azimuthal step in degrees.
    pub fn delta_phi(&self) -> f64 {
        self.spec.delta_phi
    }

    pub fn delta_t(&self) -> f64 {
        self.spec.delta_t
    }

    /// Shape of the node-aligned arrays (`E_z`, `H_r`, medium, scale factors).
    pub fn shape(&self) -> (usize, usize) {
        (self.spec.size_r, self.spec.size_phi)
    }

    /// Radius of row `r`.
    pub fn radius(&self, r: usize) -> f64 {
        r as f64 * self.spec.delta_r
    }

    /// Radius of row `r`, with the axis row replaced by [`AXIS_RADIUS`].
    pub fn regularised_radius(&self, r: usize) -> f64 {
        if r == 0 {
            AXIS_RADIUS
        } else {
            self.radius(r)
        }
    }

    /// Azimuth of column `phi` in degrees.
    pub fn phi_degrees(&self, phi: usize) -> f64 {
        phi as f64 * self.spec.delta_phi
    }

    /// Azimuth of column `phi` in radians.
    pub fn phi_radians(&self, phi: usize) -> f64 {
        std::f64::consts::PI * self.phi_degrees(phi) / 180.0
    }

    /// Cartesian position `(x, y)` of node `(r, phi)`.
    pub fn cartesian(&self, r: usize, phi: usize) -> (f64, f64) {
        let radius = self.regularised_radius(r);
        let theta = self.phi_radians(phi);
        (radius * theta.cos(), radius * theta.sin())
    }

    /// Cartesian coordinates of every node, shaped like `E_z`.
    pub fn cartesian_grid(&self) -> CartesianGrid {
        let shape = self.shape();
        CartesianGrid {
            x: Array2::from_shape_fn(shape, |(r, phi)| self.cartesian(r, phi).0),
            y: Array2::from_shape_fn(shape, |(r, phi)| self.cartesian(r, phi).1),
        }
    }

    /// Largest stable time step suggested by the CFL condition of this
    /// discretisation, evaluated on the innermost interior ring where the
    /// azimuthal arc `r * delta_phi` is shortest.
    ///
    /// The azimuthal step enters in degrees, exactly as it does in the update
    /// coefficients. This is an estimate for reporting only; the stepper never
    /// checks it.
    pub fn courant_estimate(&self, max_wave_speed: f64) -> f64 {
        let dr = self.spec.delta_r;
        let arc = self.radius(1) * self.spec.delta_phi;
        1.0 / (max_wave_speed * (1.0 / (dr * dr) + 1.0 / (arc * arc)).sqrt())
    }
}

/// Cartesian coordinates of every grid node.
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianGrid {
    /// x coordinate, shape `(size_r, size_phi)`.
    pub x: Array2<f64>,
    /// y coordinate, shape `(size_r, size_phi)`.
    pub y: Array2<f64>,
}

impl CartesianGrid {
    pub fn point(&self, r: usize, phi: usize) -> (f64, f64) {
        (self.x[[r, phi]], self.y[[r, phi]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spec(size_phi: usize, delta_phi: f64) -> GridSpec {
        GridSpec {
            size_phi,
            delta_phi,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_grid_is_valid() {
        let grid = Grid::new(GridSpec::default()).unwrap();
        assert_eq!(grid, Grid::default());
        assert_eq!(grid.shape(), (100, 180));
    }

    #[test]
    fn test_non_tiling_azimuth_rejected() {
        let err = Grid::new(spec(170, 2.0)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::AzimuthNotTiling {
                size_phi: 170,
                delta_phi: 2.0
            }
        );
        assert!(Grid::new(spec(360, 1.0)).is_ok());
        assert!(Grid::new(spec(7, 360.0 / 7.0)).is_ok());
    }

    #[test]
    fn test_non_positive_steps_rejected() {
        for (name, patch) in [
            ("delta_r", GridSpec { delta_r: 0.0, ..Default::default() }),
            ("delta_t", GridSpec { delta_t: -1.0, ..Default::default() }),
            ("delta_phi", GridSpec { delta_phi: f64::NAN, ..Default::default() }),
        ] {
            match Grid::new(patch) {
                Err(ConfigError::NonPositiveStep { name: got, .. }) => assert_eq!(got, name),
                other => panic!("expected NonPositiveStep for {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_too_small_grid_rejected() {
        let err = Grid::new(GridSpec { size_r: 2, ..Default::default() }).unwrap_err();
        assert!(matches!(err, ConfigError::GridTooSmall { size_r: 2, .. }));
    }

    #[test]
    fn test_cartesian_mapping() {
        let grid = Grid::default();
        let (x, y) = grid.cartesian(10, 0);
        assert_relative_eq!(x, 10.0);
        assert_eq!(y, 0.0);

        // 45 columns of 2° is a quarter turn
        let (x, y) = grid.cartesian(10, 45);
        assert!(x.abs() < 1e-12);
        assert_relative_eq!(y, 10.0);

        let (x, y) = grid.cartesian(4, 90);
        assert_relative_eq!(x, -4.0);
        assert!(y.abs() < 1e-12);
    }

    #[test]
    fn test_axis_row_maps_near_origin_but_not_onto_it() {
        let grid = Grid::default();
        for phi in 0..grid.size_phi() {
            let (x, y) = grid.cartesian(0, phi);
            let rho = (x * x + y * y).sqrt();
            assert_relative_eq!(rho, AXIS_RADIUS, max_relative = 1e-12);
        }
        assert_eq!(grid.radius(0), 0.0);
    }

    #[test]
    fn test_cartesian_grid_matches_pointwise_mapping() {
        let grid = Grid::new(GridSpec { size_r: 5, size_phi: 8, delta_phi: 45.0, ..Default::default() }).unwrap();
        let coords = grid.cartesian_grid();
        assert_eq!(coords.x.dim(), (5, 8));
        for r in 0..5 {
            for phi in 0..8 {
                assert_eq!(coords.point(r, phi), grid.cartesian(r, phi));
            }
        }
    }

    #[test]
    fn test_courant_estimate_for_reference_grid() {
        let grid = Grid::default();
        let dt_max = grid.courant_estimate(1.0);
        assert_relative_eq!(dt_max, 1.0 / 1.25_f64.sqrt(), max_relative = 1e-12);
        assert!(grid.delta_t() > dt_max);
    }
}
