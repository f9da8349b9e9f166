//! Sweeper CLI library.
//!
//! Loads sweep jobs from a TOML file or command-line flags and runs one
//! [`Sweeper`](sweeper_core::Sweeper) per job against a shared SQLite database.

pub mod cli;
pub mod config;
pub mod error;
pub mod runner;

pub use cli::Cli;
pub use config::{Config, Job};
pub use error::{CliError, Result};
pub use runner::{run_jobs, spawn_job, JobHandle};
