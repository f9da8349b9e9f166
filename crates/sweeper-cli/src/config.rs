//! Job file parsing.
//!
//! A job file names one SQLite database and any number of tables to keep
//! bounded:
//!
//! ```toml
//! database = "app.db"
//!
//! [[jobs]]
//! name = "reservations"
//! table = "reservation"
//! column = "expiry"
//! batch_size = 1000
//! retention_secs = 0
//! preset = "aggressive"
//! batch_interval_ms = 250
//! ```
//!
//! `preset` picks the starting schedule (`default`, `aggressive` or
//! `lenient`); explicit timing fields override it.

use crate::cli::Cli;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sweeper_core::{SweepPreset, SweepSchedule};

/// Top-level job file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// SQLite database shared by every job
    pub database: PathBuf,

    /// Tables to sweep
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// One table kept bounded by one sweeper.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    /// Label used in logs (defaults to the table name)
    #[serde(default)]
    pub name: Option<String>,

    /// Table to delete from
    pub table: String,

    /// Unix-seconds timestamp column
    pub column: String,

    /// Maximum rows deleted per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Rows newer than this are kept
    #[serde(default)]
    pub retention_secs: u64,

    /// Starting schedule
    #[serde(default)]
    pub preset: SweepPreset,

    /// Wait between campaigns, overriding the preset
    #[serde(default)]
    pub sweep_interval_ms: Option<u64>,

    /// Wait between batches, overriding the preset
    #[serde(default)]
    pub batch_interval_ms: Option<u64>,

    /// Stop between batches, overriding the preset
    #[serde(default)]
    pub stop_between_batches: Option<bool>,
}

fn default_batch_size() -> u32 {
    1000
}

impl Job {
    /// Name shown in logs.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.table)
    }

    /// Retention window as Duration.
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    /// The preset with explicit timing fields applied.
    pub fn schedule(&self) -> SweepSchedule {
        let base = self.preset.schedule();
        SweepSchedule {
            sweep_interval_ms: self.sweep_interval_ms.unwrap_or(base.sweep_interval_ms),
            batch_interval_ms: self.batch_interval_ms.unwrap_or(base.batch_interval_ms),
            stop_between_batches: self.stop_between_batches.unwrap_or(base.stop_between_batches),
        }
    }
}

impl Config {
    /// Load a job file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Combine the job file (if any) with command-line flags.
    ///
    /// `--database` replaces the file's database; `--table`/`--column` add
    /// one more job built from the remaining flags.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match (&cli.config, &cli.database) {
            (Some(path), _) => Self::from_file(path)?,
            (None, Some(database)) => Config {
                database: database.clone(),
                jobs: Vec::new(),
            },
            (None, None) => {
                return Err(CliError::Config(
                    "either --config or --database is required".to_string(),
                ))
            }
        };

        if let Some(database) = &cli.database {
            config.database = database.clone();
        }

        if let Some(table) = &cli.table {
            let column = cli.column.clone().ok_or_else(|| {
                CliError::Config(format!("--column is required to sweep table '{}'", table))
            })?;
            config.jobs.push(Job {
                name: None,
                table: table.clone(),
                column,
                batch_size: cli.batch_size,
                retention_secs: cli.retention_secs,
                preset: cli.preset,
                sweep_interval_ms: cli.sweep_interval_ms,
                batch_interval_ms: cli.batch_interval_ms,
                stop_between_batches: cli.stop_between_batches.then_some(true),
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that there is work to do and every schedule is usable.
    pub fn validate(&self) -> Result<()> {
        if self.jobs.is_empty() {
            return Err(CliError::Config("no jobs configured".to_string()));
        }
        for job in &self.jobs {
            if job.batch_size == 0 {
                return Err(CliError::Config(format!(
                    "job '{}': batch_size must be greater than zero",
                    job.label()
                )));
            }
            job.schedule().validate()?;
        }
        Ok(())
    }
}
