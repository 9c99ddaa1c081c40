//! Polaris command-line interface.
//!
//! Run FDTD simulations from TOML configuration files:
//! ```sh
//! polaris-cli run job.toml
//! polaris-cli validate job.toml
//! polaris-cli sources
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "polaris-cli")]
#[command(about = "Polaris: cylindrical-polar TMz FDTD solver")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running the simulation.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Display the available source profiles.
    Sources,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("Polaris FDTD Solver");
            println!("===================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));
            let result = runner::run_simulation(&job, &out_dir)?;

            if job.output.save_summary {
                runner::write_summary_json(&result, &job, &out_dir.join("summary.json"))?;
            }

            if !result.summary.finite {
                println!("Warning: fields diverged to non-finite values");
            }
            println!(
                "Simulation complete: {} steps, peak |E_z| = {:.4e}",
                result.summary.steps, result.summary.peak.e_z
            );
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let stepper = runner::build_stepper(&job)?;
            let grid = stepper.grid();
            let courant = runner::courant_estimate(&stepper);
            println!("Configuration is valid: {}", config.display());
            println!(
                "  dt = {}, stability estimate = {:.4}{}",
                grid.delta_t(),
                courant,
                if grid.delta_t() > courant { " (exceeded)" } else { "" }
            );
            Ok(())
        }
        Commands::Sources => {
            println!("Available source profiles:");
            println!();
            println!("  gaussian  A·exp(-(t - delay)² / spread)");
            println!("            amplitude = 1, delay = 30, spread = 100");
            println!("  sinusoid  A·cos(omega·t)");
            println!("            amplitude = 1, omega = 1e-4");
            println!("  ricker    A·(1 - 2a)·exp(-a), a = (π(courant·t / points_per_wave - 1))²");
            println!("            amplitude = 1, points_per_wave = 20, courant = 1");
            println!();
            println!("  Locations: cell {{ r, phi }} or ring {{ r }}");
            println!("  Modes:     soft (add, default) or hard (overwrite)");
            Ok(())
        }
    }
}
