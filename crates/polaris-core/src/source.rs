//! Source excitation.
//!
//! A [`Source`] couples a temporal profile (any [`SourceProfile`]) with a place
//! on the `E_z` grid and an injection mode. It is applied once per time step,
//! after the `E_z` update, and never reads the field state.

use std::f64::consts::PI;
use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::grid::Grid;

/// A scalar excitation as a function of the step index.
pub trait SourceProfile: Send + Sync {
    /// Excitation value at step `step`.
    fn amplitude(&self, step: usize) -> f64;

    /// Human-readable name of the profile.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> SourceProfile for F
where
    F: Fn(usize) -> f64 + Send + Sync,
{
    fn amplitude(&self, step: usize) -> f64 {
        self(step)
    }
}

/// Gaussian pulse $A\,e^{-(t - t_0)^2 / \sigma^2}$.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianPulse {
    pub amplitude: f64,
    /// Step index of the peak, $t_0$.
    pub delay: f64,
    /// $\sigma^2$, in squared steps.
    pub spread: f64,
}

impl Default for GaussianPulse {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            delay: 30.0,
            spread: 100.0,
        }
    }
}

impl SourceProfile for GaussianPulse {
    fn amplitude(&self, step: usize) -> f64 {
        let offset = step as f64 - self.delay;
        self.amplitude * (-(offset * offset) / self.spread).exp()
    }

    fn name(&self) -> &str {
        "gaussian"
    }
}

/// Continuous wave $A\cos(\omega t)$.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sinusoid {
    pub amplitude: f64,
    /// Angular frequency in radians per step.
    pub omega: f64,
}

impl Default for Sinusoid {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            omega: 1e-4,
        }
    }
}

impl SourceProfile for Sinusoid {
    fn amplitude(&self, step: usize) -> f64 {
        self.amplitude * (self.omega * step as f64).cos()
    }

    fn name(&self) -> &str {
        "sinusoid"
    }
}

/// Ricker wavelet $A(1 - 2a)e^{-a}$ with $a = (\pi(S_c t / N_\lambda - 1))^2$.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RickerWavelet {
    pub amplitude: f64,
    /// Points per wavelength at the peak frequency, $N_\lambda$.
    pub points_per_wave: f64,
    /// Courant number $S_c$ used to convert steps into cells.
    pub courant: f64,
}

impl Default for RickerWavelet {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            points_per_wave: 20.0,
            courant: 1.0,
        }
    }
}

impl SourceProfile for RickerWavelet {
    fn amplitude(&self, step: usize) -> f64 {
        let arg = (PI * (self.courant * step as f64 / self.points_per_wave - 1.0)).powi(2);
        self.amplitude * (1.0 - 2.0 * arg) * (-arg).exp()
    }

    fn name(&self) -> &str {
        "ricker"
    }
}

/// Serialisable choice of built-in profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileSpec {
    Gaussian(GaussianPulse),
    Sinusoid(Sinusoid),
    Ricker(RickerWavelet),
}

impl Default for ProfileSpec {
    fn default() -> Self {
        ProfileSpec::Gaussian(GaussianPulse::default())
    }
}

impl ProfileSpec {
    /// Validate the parameters and box the profile.
    pub fn build(&self) -> ConfigResult<Box<dyn SourceProfile>> {
        match *self {
            ProfileSpec::Gaussian(p) => {
                finite("amplitude", p.amplitude)?;
                finite("delay", p.delay)?;
                positive("spread", p.spread)?;
                Ok(Box::new(p))
            }
            ProfileSpec::Sinusoid(p) => {
                finite("amplitude", p.amplitude)?;
                finite("omega", p.omega)?;
                Ok(Box::new(p))
            }
            ProfileSpec::Ricker(p) => {
                finite("amplitude", p.amplitude)?;
                positive("points_per_wave", p.points_per_wave)?;
                positive("courant", p.courant)?;
                Ok(Box::new(p))
            }
        }
    }
}

fn finite(name: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidSourceParameter { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSourceParameter { name, value })
    }
}

/// Where on the `E_z` grid the excitation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceLocation {
    /// A single node.
    Cell { r: usize, phi: usize },
    /// Every azimuthal node of one row.
    Ring { r: usize },
}

impl Default for SourceLocation {
    fn default() -> Self {
        SourceLocation::Cell { r: 50, phi: 90 }
    }
}

/// How the excitation combines with the existing field value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionMode {
    /// Add the profile value to the field.
    #[default]
    Soft,
    /// Overwrite the field with the profile value.
    Hard,
}

/// Serialisable description of a [`Source`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSpec {
    pub location: SourceLocation,
    pub mode: InjectionMode,
    pub profile: ProfileSpec,
}

/// An excitation bound to a location on the `E_z` grid.
pub struct Source {
    location: SourceLocation,
    mode: InjectionMode,
    profile: Box<dyn SourceProfile>,
}

impl Source {
    /// Soft source with an arbitrary profile.
    pub fn new(location: SourceLocation, profile: impl SourceProfile + 'static) -> Self {
        Self {
            location,
            mode: InjectionMode::Soft,
            profile: Box::new(profile),
        }
    }

    /// Soft point source at node `(r, phi)`.
    pub fn point(r: usize, phi: usize, profile: impl SourceProfile + 'static) -> Self {
        Self::new(SourceLocation::Cell { r, phi }, profile)
    }

    pub fn with_mode(mut self, mode: InjectionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn from_spec(spec: &SourceSpec) -> ConfigResult<Self> {
        Ok(Self {
            location: spec.location,
            mode: spec.mode,
            profile: spec.profile.build()?,
        })
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    pub fn mode(&self) -> InjectionMode {
        self.mode
    }

    pub fn profile(&self) -> &dyn SourceProfile {
        self.profile.as_ref()
    }

    /// Check that the source lies on `grid`.
    pub fn check_fits(&self, grid: &Grid) -> ConfigResult<()> {
        let (size_r, size_phi) = grid.shape();
        let (r, phi) = match self.location {
            SourceLocation::Cell { r, phi } => (r, phi),
            SourceLocation::Ring { r } => (r, 0),
        };
        if r >= size_r || phi >= size_phi {
            return Err(ConfigError::SourceOutOfBounds { r, phi, size_r, size_phi });
        }
        Ok(())
    }

    /// Apply the excitation for `step` to `e_z`.
    pub(crate) fn inject(&self, e_z: &mut Array2<f64>, step: usize) {
        let value = self.profile.amplitude(step);
        let apply = |cell: &mut f64| match self.mode {
            InjectionMode::Soft => *cell += value,
            InjectionMode::Hard => *cell = value,
        };
        match self.location {
            SourceLocation::Cell { r, phi } => apply(&mut e_z[[r, phi]]),
            SourceLocation::Ring { r } => e_z.row_mut(r).iter_mut().for_each(apply),
        }
    }
}

impl Default for Source {
    /// The reference excitation: a soft Gaussian pulse at node (50, 90).
    fn default() -> Self {
        Self::new(SourceLocation::default(), GaussianPulse::default())
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("location", &self.location)
            .field("mode", &self.mode)
            .field("profile", &self.profile.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gaussian_peaks_at_delay() {
        let g = GaussianPulse::default();
        assert_eq!(g.amplitude(30), 1.0);
        assert_relative_eq!(g.amplitude(40), (-1.0_f64).exp());
        assert_eq!(g.amplitude(20), g.amplitude(40));
        assert!(g.amplitude(1000) < 1e-300);
    }

    #[test]
    fn test_ricker_peak_and_zero_crossing() {
        let ricker = RickerWavelet::default();
        // a = 0 at t = N_λ / S_c
        assert_eq!(ricker.amplitude(20), 1.0);
        // 1 - 2a = 0 when π(t/20 - 1) = ±1/√2
        let t = 20.0 * (1.0 + 1.0 / (PI * 2.0_f64.sqrt()));
        let near = ricker.amplitude(t.round() as usize);
        assert!(near.abs() < 0.2, "got {near}");
        assert!(ricker.amplitude(0) < 0.0);
    }

    #[test]
    fn test_sinusoid_and_closure_profiles() {
        let wave = Sinusoid { amplitude: 2.0, omega: PI / 2.0 };
        assert_relative_eq!(wave.amplitude(0), 2.0);
        assert!(wave.amplitude(1).abs() < 1e-12);
        assert_relative_eq!(wave.amplitude(2), -2.0);

        let ramp = |t: usize| t as f64 * 0.5;
        assert_eq!(SourceProfile::amplitude(&ramp, 4), 2.0);
        assert_eq!(SourceProfile::name(&ramp), "custom");
    }

    #[test]
    fn test_soft_and_hard_injection() {
        let mut e_z = Array2::from_elem((4, 6), 1.0);
        Source::point(2, 3, |_: usize| 0.5).inject(&mut e_z, 1);
        assert_eq!(e_z[[2, 3]], 1.5);
        assert_eq!(e_z.iter().filter(|&&v| v != 1.0).count(), 1);

        Source::point(2, 3, |_: usize| 0.25)
            .with_mode(InjectionMode::Hard)
            .inject(&mut e_z, 1);
        assert_eq!(e_z[[2, 3]], 0.25);
    }

    #[test]
    fn test_ring_injection_covers_row() {
        let mut e_z = Array2::zeros((4, 6));
        Source::new(SourceLocation::Ring { r: 0 }, |t: usize| t as f64)
            .with_mode(InjectionMode::Hard)
            .inject(&mut e_z, 7);
        assert!(e_z.row(0).iter().all(|&v| v == 7.0));
        assert!(e_z.rows().into_iter().skip(1).all(|row| row.iter().all(|&v| v == 0.0)));
    }

    #[test]
    fn test_out_of_bounds_source_rejected() {
        let grid = Grid::default();
        assert!(Source::default().check_fits(&grid).is_ok());
        assert!(matches!(
            Source::point(100, 0, |_: usize| 0.0).check_fits(&grid),
            Err(ConfigError::SourceOutOfBounds { r: 100, .. })
        ));
        assert!(Source::point(0, 180, |_: usize| 0.0).check_fits(&grid).is_err());
        assert!(Source::new(SourceLocation::Ring { r: 99 }, |_: usize| 0.0).check_fits(&grid).is_ok());
    }

    #[test]
    fn test_invalid_profile_parameters_rejected() {
        let bad = ProfileSpec::Gaussian(GaussianPulse { spread: 0.0, ..Default::default() });
        assert!(matches!(
            bad.build(),
            Err(ConfigError::InvalidSourceParameter { name: "spread", .. })
        ));
        let bad = ProfileSpec::Ricker(RickerWavelet { points_per_wave: -1.0, ..Default::default() });
        assert!(bad.build().is_err());

        let source = Source::from_spec(&SourceSpec::default()).unwrap();
        assert_eq!(source.location(), SourceLocation::Cell { r: 50, phi: 90 });
        assert_eq!(source.profile().name(), "gaussian");
        assert_eq!(source.profile().amplitude(30), 1.0);
    }

    #[test]
    fn test_source_spec_from_json() {
        let spec: SourceSpec = serde_json::from_str(
            r#"{ "location": { "kind": "ring", "r": 0 }, "mode": "hard",
                 "profile": { "kind": "ricker", "points_per_wave": 10.0 } }"#,
        )
        .unwrap();
        assert_eq!(spec.location, SourceLocation::Ring { r: 0 });
        assert_eq!(spec.mode, InjectionMode::Hard);
        assert_eq!(
            spec.profile,
            ProfileSpec::Ricker(RickerWavelet { points_per_wave: 10.0, ..Default::default() })
        );
    }
}
