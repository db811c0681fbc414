//! gyre command-line interface.
//!
//! Run simulations from TOML configuration files:
//! ```sh
//! gyre run job.toml
//! gyre validate job.toml
//! gyre backends
//! ```

mod config;
mod initial;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gyre")]
#[command(about = "gyre: 2D incompressible vorticity solver")]
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
    /// Display information about available compute backends.
    Backends,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("gyre 2D Vorticity Solver");
            println!("========================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            let result = runner::run_simulation(&job, &out_dir)?;

            // Diagnostic time series (default on)
            if job.output.save_timeseries {
                let csv_path = out_dir.join("timeseries.csv");
                runner::write_timeseries_csv(&result.timeseries, &csv_path, &job)?;
            }

            // Final vorticity field (default on)
            if job.output.save_final_field {
                let field_path = out_dir.join("vorticity_final.csv");
                runner::write_field_csv(
                    &result.final_vorticity,
                    &field_path,
                    &job,
                    result.final_time,
                )?;
            }

            println!("Simulation complete (t = {:.4}).", result.final_time);
            Ok(())
        }
        Commands::Validate { config } => {
            let _job = config::load_config(&config)?;
            println!("Configuration is valid: {}", config.display());
            Ok(())
        }
        Commands::Backends => {
            println!("Available backends:");
            println!();
            println!("  serial   — single-threaded reference evaluator");
            println!("  parallel — rayon-threaded evaluator, same numbers to");
            println!("             floating-point association tolerance");
            Ok(())
        }
    }
}
