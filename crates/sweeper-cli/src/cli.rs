//! CLI argument definitions and parsing.

use clap::Parser;
use std::path::PathBuf;
use sweeper_core::SweepPreset;

/// Sweeper - Keep append-heavy SQLite tables bounded by deleting expired rows in batches.
///
/// Either point at a TOML job file with `--config`, or describe a single job
/// with `--database`, `--table` and `--column`.
#[derive(Debug, Parser)]
#[command(name = "sweeper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Job file (TOML)
    #[arg(short, long, env = "SWEEPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides the job file)
    #[arg(short, long, env = "SWEEPER_DATABASE")]
    pub database: Option<PathBuf>,

    /// Table to sweep
    #[arg(short, long)]
    pub table: Option<String>,

    /// Unix-seconds timestamp column compared against the cutoff
    #[arg(long, requires = "table")]
    pub column: Option<String>,

    /// Maximum rows deleted per batch
    #[arg(short, long, default_value = "1000")]
    pub batch_size: u32,

    /// Keep rows newer than this many seconds
    #[arg(short, long, default_value = "0")]
    pub retention_secs: u64,

    /// Timing preset: default, aggressive or lenient
    #[arg(long, default_value = "default")]
    pub preset: SweepPreset,

    /// Wait between campaigns in milliseconds (overrides the preset)
    #[arg(long)]
    pub sweep_interval_ms: Option<u64>,

    /// Wait between batches in milliseconds (overrides the preset)
    #[arg(long)]
    pub batch_interval_ms: Option<u64>,

    /// Stop between batches instead of finishing the running campaign
    #[arg(long)]
    pub stop_between_batches: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
