//! Cellsino command-line interface.
//!
//! Compute sinograms from TOML configuration files:
//! ```sh
//! cellsino run job.toml
//! cellsino validate job.toml
//! cellsino draw job.toml -o truth.json
//! cellsino list
//! ```

mod config;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cellsino_core::{Mode, PropagatorKind};
use cellsino_geometry::PhantomKind;

#[derive(Parser)]
#[command(name = "cellsino")]
#[command(about = "Cellsino: in-silico sinograms of cell phantoms")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a sinogram from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output file (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Replace an existing output file instead of refusing to run.
        #[arg(long)]
        force: bool,
    },
    /// Validate a configuration file without computing anything.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Write the ground-truth refractive index and fluorescence volumes.
    Draw {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output JSON file.
        #[arg(short, long, default_value = "ground_truth.json")]
        output: PathBuf,
        /// Number of voxels along z (defaults to the largest detector edge).
        #[arg(long)]
        depth: Option<usize>,
    },
    /// List available phantoms, propagators, and modes.
    List,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            force,
        } => {
            println!("Cellsino");
            println!("========");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let path = output.unwrap_or_else(|| PathBuf::from(&job.output.path));
            if path.exists() {
                if !force {
                    anyhow::bail!(
                        "Output file {} exists and frames would be appended to it \
                         (use --force to replace)",
                        path.display()
                    );
                }
                std::fs::remove_file(&path)?;
            }

            let written = runner::run_job(&job, &path)?;
            println!("Sinogram written to: {}", written.display());
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let frames = runner::validate(&job)?;
            println!(
                "Configuration is valid: {} ({} frames)",
                config.display(),
                frames
            );
            Ok(())
        }
        Commands::Draw {
            config,
            output,
            depth,
        } => {
            let job = config::load_config(&config)?;
            runner::draw_ground_truth(&job, depth, &output)
        }
        Commands::List => {
            println!("Phantoms:");
            for name in PhantomKind::names() {
                println!("  {name}");
            }
            println!("  custom (spheres from [[sphere]] only)");
            println!();
            println!("Propagators:");
            for name in PropagatorKind::names() {
                println!("  {name}");
            }
            println!();
            println!("Modes:");
            for mode in Mode::ALL {
                println!("  {mode}");
            }
            println!();
            println!("Default [simple_cell] parameters:");
            print!("{}", runner::simple_cell_defaults()?);
            Ok(())
        }
    }
}
