//! Simulation runner: ties together grid, medium, source and time stepper,
//! and exports what the stepper observes.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use polaris_compute::{ComputeBackend, CpuBackend, SerialBackend};
use polaris_core::{
    FieldPeaks, Grid, GridSpec, RunSummary, Snapshot, SnapshotObserver, Source, SourceSpec,
    TimeStepper,
};

use crate::config::JobConfig;

/// Results from a simulation run.
pub struct SimulationOutput {
    pub summary: RunSummary,
    pub snapshot_files: Vec<PathBuf>,
    pub courant_estimate: f64,
}

/// Build a ready-to-run stepper from a parsed job configuration.
pub fn build_stepper(job: &JobConfig) -> Result<TimeStepper> {
    let params = &job.simulation.params;
    let grid = Grid::new(params.grid.clone()).context("Invalid grid")?;
    let medium = job.medium.build(&grid)?;
    let source = Source::from_spec(&job.source).context("Invalid source")?;
    let backend = create_backend(&job.simulation.backend, job.simulation.threads)?;

    let stepper = TimeStepper::new(params, medium, source)
        .context("Invalid simulation configuration")?
        .with_backend(backend);
    Ok(stepper)
}

/// Stability estimate for the stepper's grid and medium.
pub fn courant_estimate(stepper: &TimeStepper) -> f64 {
    stepper.grid().courant_estimate(stepper.medium().max_wave_speed())
}

/// Run a full simulation, writing snapshots into `out_dir` when enabled.
pub fn run_simulation(job: &JobConfig, out_dir: &Path) -> Result<SimulationOutput> {
    let mut stepper = build_stepper(job)?;
    let grid = stepper.grid();
    let courant = courant_estimate(&stepper);

    println!(
        "Grid: {} x {} (dr={}, dphi={} deg), dt={}",
        grid.size_r(),
        grid.size_phi(),
        grid.delta_r(),
        grid.delta_phi(),
        grid.delta_t()
    );
    if grid.delta_t() > courant {
        println!(
            "Warning: dt={} exceeds the stability estimate {:.4}; fields may diverge",
            grid.delta_t(),
            courant
        );
    }

    let mut snapshot_files = Vec::new();
    let summary = if job.output.save_snapshots {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Cannot create output directory {}", out_dir.display()))?;
        let mut writer = SnapshotWriter::new(out_dir, stepper.max_time());
        let summary = stepper.run(&mut writer);
        snapshot_files = writer.finish()?;
        println!("Snapshots written to: {} ({} files)", out_dir.display(), snapshot_files.len());
        summary
    } else {
        stepper.run(&mut |_: &Snapshot<'_>| {})
    };

    Ok(SimulationOutput {
        summary,
        snapshot_files,
        courant_estimate: courant,
    })
}

/// Writes one CSV file per snapshot.
///
/// The first I/O error is kept and every later snapshot is skipped; it is
/// reported by [`SnapshotWriter::finish`].
pub struct SnapshotWriter {
    directory: PathBuf,
    max_time: usize,
    written: Vec<PathBuf>,
    error: Option<io::Error>,
}

impl SnapshotWriter {
    pub fn new(directory: &Path, max_time: usize) -> Self {
        Self {
            directory: directory.to_path_buf(),
            max_time,
            written: Vec::new(),
            error: None,
        }
    }

    /// Paths written so far, or the first write error.
    pub fn finish(self) -> Result<Vec<PathBuf>> {
        match self.error {
            Some(e) => Err(e).context("Failed to write snapshot"),
            None => Ok(self.written),
        }
    }

    fn write(&self, snapshot: &Snapshot<'_>, path: &Path) -> io::Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        let (size_r, size_phi) = snapshot.e_z.dim();

        writeln!(file, "# Polaris FDTD snapshot")?;
        writeln!(file, "# step: {}, time: {}", snapshot.step, snapshot.time)?;
        writeln!(file, "# grid: {}x{}", size_r, size_phi)?;
        writeln!(file, "# h_phi: half-integral r, empty on the last row")?;
        writeln!(file, "#")?;
        writeln!(file, "r_index,phi_index,x,y,e_z,h_r,h_phi")?;

        for r in 0..size_r {
            for phi in 0..size_phi {
                let (x, y) = snapshot.coordinates.point(r, phi);
                write!(
                    file,
                    "{},{},{:.6},{:.6},{:.6e},{:.6e},",
                    r, phi, x, y, snapshot.e_z[[r, phi]], snapshot.h_r[[r, phi]]
                )?;
                match snapshot.h_phi.get((r, phi)) {
                    Some(v) => writeln!(file, "{:.6e}", v)?,
                    None => writeln!(file)?,
                }
            }
        }
        file.flush()
    }
}

impl SnapshotObserver for SnapshotWriter {
    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) {
        if self.error.is_some() {
            return;
        }
        let path = self.directory.join(format!("snapshot_{:05}.csv", snapshot.step));
        match self.write(snapshot, &path) {
            Ok(()) => {
                log::debug!("Wrote {}", path.display());
                self.written.push(path);
            }
            Err(e) => {
                log::error!("Cannot write {}: {}", path.display(), e);
                self.error = Some(e);
                return;
            }
        }

        if self.written.len() % 10 == 0 {
            let peaks = snapshot.peaks();
            println!(
                "  [{}/{}] |E_z|max={:.3e}, |H_r|max={:.3e}, |H_phi|max={:.3e}",
                snapshot.step,
                self.max_time.saturating_sub(1),
                peaks.e_z,
                peaks.h_r,
                peaks.h_phi
            );
        }
    }
}

/// Everything recorded about a finished job.
#[derive(Debug, Serialize)]
struct JobReport<'a> {
    version: &'static str,
    grid: &'a GridSpec,
    max_time: usize,
    snapshot_interval: usize,
    backend: &'a str,
    source: &'a SourceSpec,
    courant_estimate: f64,
    steps: usize,
    final_step: usize,
    peak: FieldPeaks,
    final_energy: f64,
    finite: bool,
    snapshots: Vec<String>,
}

/// Write the run summary to a JSON file.
pub fn write_summary_json(output: &SimulationOutput, job: &JobConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let params = &job.simulation.params;
    let report = JobReport {
        version: env!("CARGO_PKG_VERSION"),
        grid: &params.grid,
        max_time: params.max_time,
        snapshot_interval: params.snapshot_interval,
        backend: &job.simulation.backend,
        source: &job.source,
        courant_estimate: output.courant_estimate,
        steps: output.summary.steps,
        final_step: output.summary.final_step,
        peak: output.summary.peak,
        final_energy: output.summary.final_energy,
        finite: output.summary.finite,
        snapshots: output
            .snapshot_files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect(),
    };

    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Summary written to: {}", path.display());
    Ok(())
}

/// Create a compute backend based on the user's preference string.
///
/// - `"serial"` (default): single thread, rows in order.
/// - `"cpu"`: Rayon row-parallel, on a dedicated pool when `threads` is set.
fn create_backend(preference: &str, threads: Option<usize>) -> Result<Arc<dyn ComputeBackend>> {
    let backend: Arc<dyn ComputeBackend> = match preference {
        "serial" => Arc::new(SerialBackend),
        "cpu" => match threads {
            Some(n) => Arc::new(CpuBackend::with_threads(n)?),
            None => Arc::new(CpuBackend::new()),
        },
        other => anyhow::bail!("Unknown backend '{}'. Valid backends: serial, cpu", other),
    };
    println!("Backend: {}", backend.device_info().name);
    Ok(backend)
}
