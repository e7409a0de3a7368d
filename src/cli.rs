//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Hourly energy balance simulator with economics and capacity optimization.
///
/// If neither `--scenario` nor `--preset` is given, the baseline preset is used.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "merit-sim", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Load the scenario from a TOML config file.
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, high_renewables, firmed).
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Run the capacity optimizer after the simulation.
    #[arg(long, default_value_t = false)]
    pub optimize: bool,

    /// Override the optimizer and synthetic profile seeds.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the hourly energy balance to CSV (enables hourly detail).
    #[arg(long, value_name = "PATH")]
    pub detail_out: Option<PathBuf>,

    /// Write the per-technology summary to CSV.
    #[arg(long, value_name = "PATH")]
    pub summary_out: Option<PathBuf>,

    /// Write the optimizer result to JSON (implies --optimize).
    #[arg(long, value_name = "PATH")]
    pub optimizer_out: Option<PathBuf>,

    /// Print one line per simulated hour.
    #[arg(long, default_value_t = false)]
    pub hourly: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl CliArgs {
    /// Whether the optimizer should run.
    pub fn wants_optimizer(&self) -> bool {
        self.optimize || self.optimizer_out.is_some()
    }
}
