//! TOML configuration deserialisation for simulation jobs.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use polaris_core::{Grid, Medium, SectorRegion, SimulationParams, SourceSpec};

/// Top-level job configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub source: SourceSpec,
    #[serde(default)]
    pub medium: MediumConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Run parameters from TOML.
///
/// Grid cell counts and steps live under `[simulation.grid]`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(flatten)]
    pub params: SimulationParams,
    /// Compute backend: "serial" or "cpu". Default: "serial".
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Worker threads for the "cpu" backend; the global Rayon pool when absent.
    #[serde(default)]
    pub threads: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            params: SimulationParams::default(),
            backend: default_backend(),
            threads: None,
        }
    }
}

fn default_backend() -> String {
    "serial".into()
}

/// Background constants plus any number of `[[medium.region]]` sectors.
#[derive(Debug, Serialize, Deserialize)]
pub struct MediumConfig {
    #[serde(default = "default_constant")]
    pub epsilon: f64,
    #[serde(default = "default_constant")]
    pub mu: f64,
    /// Applied in order; later regions overwrite earlier ones.
    #[serde(default)]
    pub region: Vec<SectorRegion>,
}

impl Default for MediumConfig {
    fn default() -> Self {
        Self {
            epsilon: default_constant(),
            mu: default_constant(),
            region: Vec::new(),
        }
    }
}

fn default_constant() -> f64 {
    1.0
}

impl MediumConfig {
    /// Build the medium on `grid`.
    pub fn build(&self, grid: &Grid) -> anyhow::Result<Medium> {
        let mut medium = Medium::uniform(grid, self.epsilon, self.mu).context("Invalid background medium")?;
        for (i, region) in self.region.iter().enumerate() {
            medium
                .fill_sector(region)
                .with_context(|| format!("Invalid medium region #{}", i + 1))?;
        }
        Ok(medium)
    }
}

/// Output configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to write a CSV file per snapshot (default: true).
    #[serde(default = "default_true")]
    pub save_snapshots: bool,
    /// Whether to write the run summary as JSON (default: true).
    #[serde(default = "default_true")]
    pub save_summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_snapshots: true,
            save_summary: true,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let config: JobConfig =
        toml::from_str(&content).with_context(|| format!("Cannot parse {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polaris_core::{InjectionMode, ProfileSpec, SourceLocation};

    #[test]
    fn test_empty_job_uses_reference_defaults() {
        let job: JobConfig = toml::from_str("").unwrap();
        assert_eq!(job.simulation.params, SimulationParams::default());
        assert_eq!(job.simulation.backend, "serial");
        assert_eq!(job.source, SourceSpec::default());
        assert!(job.medium.region.is_empty());
        assert_eq!(job.output.directory, "./output");
        assert!(job.output.save_snapshots && job.output.save_summary);
    }

    #[test]
    fn test_full_job() {
        let job: JobConfig = toml::from_str(
            r#"
            [simulation]
            max_time = 200
            snapshot_interval = 20
            backend = "cpu"
            threads = 2

            [simulation.grid]
            size_r = 40
            delta_t = 0.5

            [source]
            mode = "hard"
            location = { kind = "ring", r = 5 }
            profile = { kind = "sinusoid", omega = 0.1 }

            [medium]
            epsilon = 1.5

            [[medium.region]]
            r_start = 10
            r_end = 20
            phi_start = 170
            phi_cells = 20
            epsilon = 4.0

            [output]
            directory = "runs/ring"
            save_summary = false
            "#,
        )
        .unwrap();

        let params = &job.simulation.params;
        assert_eq!(params.max_time, 200);
        assert_eq!(params.snapshot_interval, 20);
        assert_eq!(params.grid.size_r, 40);
        assert_eq!(params.grid.size_phi, 180);
        assert_eq!(params.grid.delta_t, 0.5);
        assert_eq!(job.simulation.threads, Some(2));

        assert_eq!(job.source.mode, InjectionMode::Hard);
        assert_eq!(job.source.location, SourceLocation::Ring { r: 5 });
        assert!(matches!(job.source.profile, ProfileSpec::Sinusoid(s) if s.omega == 0.1 && s.amplitude == 1.0));

        let grid = Grid::new(params.grid.clone()).unwrap();
        let medium = job.medium.build(&grid).unwrap();
        assert_eq!(medium.epsilon()[[15, 175]], 4.0);
        assert_eq!(medium.epsilon()[[15, 9]], 4.0);
        assert_eq!(medium.epsilon()[[15, 10]], 1.5);
        assert_eq!(medium.mu()[[15, 175]], 1.0);

        assert_eq!(job.output.directory, "runs/ring");
        assert!(job.output.save_snapshots);
        assert!(!job.output.save_summary);
    }

    #[test]
    fn test_bad_region_reports_its_index() {
        let job: JobConfig = toml::from_str(
            r#"
            [[medium.region]]
            r_start = 0
            r_end = 10

            [[medium.region]]
            r_start = 50
            r_end = 500
            "#,
        )
        .unwrap();
        let err = job.medium.build(&Grid::default()).unwrap_err();
        assert!(err.to_string().contains("#2"), "{err}");
    }
}
