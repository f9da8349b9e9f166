//! Spawning and stopping sweep jobs.

use crate::config::{Config, Job};
use crate::error::Result;
use std::sync::Arc;
use sweeper_core::{StopHandle, SweepError, SweepMetrics, Sweeper};
use sweeper_store::{ExpiryPolicy, SqliteDatabase};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Report channels are drained continuously, so a small buffer is enough.
const SINK_CAPACITY: usize = 64;

/// A running sweeper and the means to stop it.
pub struct JobHandle {
    name: String,
    stop: StopHandle,
    task: JoinHandle<SweepMetrics>,
}

impl JobHandle {
    /// Job label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop the sweeper and wait for its run loop to return.
    ///
    /// A campaign in progress finishes first unless the job enables
    /// `stop_between_batches`.
    pub async fn shutdown(self) -> Result<SweepMetrics> {
        self.stop.stop().await?;
        Ok(self.task.await?)
    }
}

/// Start one sweeper for `job` on its own task.
pub fn spawn_job(db: Arc<SqliteDatabase>, job: &Job) -> Result<JobHandle> {
    let policy = ExpiryPolicy::new(&job.table, &job.column, job.batch_size, job.retention())?;
    let name = job.label().to_string();
    tracing::info!(
        job = %name,
        table = %policy.table(),
        column = %policy.column(),
        batch_size = policy.batch_size(),
        retention_secs = job.retention_secs,
        preset = %job.preset,
        "Starting sweep job"
    );

    let (error_tx, error_rx) = mpsc::channel(SINK_CAPACITY);
    let (affected_tx, affected_rx) = mpsc::channel(SINK_CAPACITY);
    let config = job
        .schedule()
        .into_config(policy.into_factory())?
        .with_error_sink(error_tx)
        .with_affected_sink(affected_tx);

    let mut sweeper = Sweeper::new(db, config);
    tracing::debug!(job = %name, config = ?sweeper.config(), "Sweeper configured");
    let stop = sweeper.stop_handle();
    let task = tokio::spawn(async move {
        sweeper.sweep().await;
        sweeper.metrics().clone()
    });
    tokio::spawn(drain_reports(name.clone(), error_rx, affected_rx));

    Ok(JobHandle { name, stop, task })
}

async fn drain_reports(
    name: String,
    mut errors: mpsc::Receiver<SweepError>,
    mut affected: mpsc::Receiver<u64>,
) {
    let mut errors_open = true;
    let mut affected_open = true;

    while errors_open || affected_open {
        tokio::select! {
            err = errors.recv(), if errors_open => match err {
                Some(e) => tracing::error!(job = %name, "Sweep failed: {}", e),
                None => errors_open = false,
            },
            rows = affected.recv(), if affected_open => match rows {
                Some(rows) => tracing::debug!(job = %name, rows, "Batch deleted rows"),
                None => affected_open = false,
            },
        }
    }
}

/// Run every configured job until Ctrl+C, then stop them all.
pub async fn run_jobs(config: Config) -> Result<()> {
    let db = Arc::new(SqliteDatabase::open(&config.database)?);
    tracing::info!("Opened database {}", config.database.display());

    let handles = config
        .jobs
        .iter()
        .map(|job| spawn_job(Arc::clone(&db), job))
        .collect::<Result<Vec<_>>>()?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping {} job(s)", handles.len());

    for handle in handles {
        let name = handle.name().to_string();
        let metrics = handle.shutdown().await?;
        tracing::info!(job = %name, "Job stopped. Final metrics:\n{}", metrics.summary());
    }

    Ok(())
}
