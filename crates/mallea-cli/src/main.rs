//! Mallea CLI: benchmarking, scripted warps and config checks.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

const DEFAULT_LOG_FILTER: &str = "warn,mallea=info,mallea_bench=info,mallea_solver=info";

#[derive(Parser)]
#[command(name = "mallea")]
#[command(version, about = "Mallea: as-rigid-as-possible image warp engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark suite.
    Benchmark {
        /// Which scenario to run (drag_anchor, twist_pose, rail_slide, seam_drag, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Material preset (defaults to each scenario's own).
        #[arg(short, long)]
        material: Option<String>,

        /// Output CSV file path.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run one scripted scenario and export the warped mesh.
    Simulate {
        /// Warp config (TOML). Image size still comes from the scenario.
        #[arg(short, long)]
        config: Option<String>,

        /// Scenario providing the image size and pin script.
        #[arg(short, long, default_value = "drag_anchor")]
        scenario: String,

        /// Override the scenario's frame count.
        #[arg(short, long)]
        frames: Option<u32>,

        /// Finish with a final-quality pass.
        #[arg(long)]
        settle: bool,

        /// Output mesh JSON path.
        #[arg(short, long, default_value = "mesh.json")]
        output: String,
    },

    /// Validate a warp config.
    Validate {
        /// Path to config file (TOML).
        path: String,
    },

    /// List the built-in material presets.
    Materials,
}

/// `RUST_LOG` wins when set (e.g. `RUST_LOG=mallea_solver=trace`);
/// otherwise WARN for everything and INFO for the mallea crates.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Benchmark {
            scenario,
            material,
            output,
        } => commands::benchmark(&scenario, material.as_deref(), output.as_deref()),
        Commands::Simulate {
            config,
            scenario,
            frames,
            settle,
            output,
        } => commands::simulate(config.as_deref(), &scenario, frames, settle, &output),
        Commands::Validate { path } => commands::validate(&path),
        Commands::Materials => commands::materials(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
