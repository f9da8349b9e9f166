//! Sweeper CLI - Batch-deletes expired rows from SQLite tables.

use clap::Parser;
use sweeper_cli::{Cli, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Log to stderr; RUST_LOG overrides --log-level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> sweeper_cli::Result<()> {
    let config = Config::from_cli(&cli)?;
    sweeper_cli::run_jobs(config).await
}
