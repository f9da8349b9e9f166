//! The sweep run loop
//!
//! A [`Sweeper`] alternates between two states. While *idle* it waits for
//! the sweep interval or a stop signal. While *sweeping* it runs one delete
//! batch per batch interval until a batch affects zero rows or fails, then
//! goes back to idle.

use crate::{SweepConfig, SweepError, SweepMetrics};
use std::fmt::Display;
use std::time::Duration;
use sweeper_domain::{Database, ExecResult};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Roughly 30 years, the same far-future horizon tokio uses internally.
/// Longer periods would overflow `Instant` arithmetic.
const MAX_PERIOD: Duration = Duration::from_secs(86_400 * 365 * 30);

/// First tick is one full period away; ticks missed during slow work collapse
/// into one.
fn ticker(period: Duration) -> Interval {
    let period = period.clamp(MIN_PERIOD, MAX_PERIOD);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

enum CampaignEnd {
    /// A batch affected zero rows
    Exhausted,
    /// Execution or row count retrieval failed
    Abandoned,
    /// Stop signal observed between batches
    Stopped,
}

/// Periodically deletes rows in bounded batches
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use sweeper_core::{SweepConfig, Sweeper};
/// use sweeper_domain::DeleteStatement;
/// use sweeper_store::SqliteDatabase;
/// use tokio::sync::mpsc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db = SqliteDatabase::open("app.db")?;
///     let (affected_tx, mut affected_rx) = mpsc::channel(64);
///
///     let config = SweepConfig::new(Duration::from_secs(60), Duration::from_millis(250), || {
///         DeleteStatement::new(
///             "DELETE FROM reservation WHERE rowid IN \
///              (SELECT rowid FROM reservation WHERE expiry < strftime('%s','now') LIMIT 1000)",
///         )
///     })
///     .with_affected_sink(affected_tx);
///
///     let mut sweeper = Sweeper::new(db, config);
///     let stop = sweeper.stop_handle();
///
///     let task = tokio::spawn(async move { sweeper.sweep().await });
///     tokio::spawn(async move {
///         while let Some(n) = affected_rx.recv().await {
///             println!("deleted {n} rows");
///         }
///     });
///
///     tokio::signal::ctrl_c().await?;
///     stop.stop().await?;
///     task.await?;
///     Ok(())
/// }
/// ```
pub struct Sweeper<D> {
    db: D,
    config: SweepConfig,
    stop_tx: mpsc::Sender<()>,
    stop_rx: mpsc::Receiver<()>,
    metrics: SweepMetrics,
}

impl<D> Sweeper<D>
where
    D: Database,
    D::Error: Display,
{
    /// Create a sweeper over `db`
    ///
    /// No I/O happens here. The stop channel is created fresh and holds at
    /// most one pending signal.
    pub fn new(db: D, config: SweepConfig) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel(1);
        Self {
            db,
            config,
            stop_tx,
            stop_rx,
            metrics: SweepMetrics::new(),
        }
    }

    /// Handle used to end a running [`sweep`](Self::sweep)
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: self.stop_tx.clone(),
        }
    }

    /// The configuration this sweeper runs with
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &SweepMetrics {
        &self.metrics
    }

    /// Reset the metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Run until a stop signal is received
    ///
    /// The stop signal is checked while idle. A campaign in progress runs
    /// to its end (zero rows or an error) before the signal is seen, unless
    /// [`SweepConfig::stop_between_batches`] is set.
    ///
    /// Failures never surface here; they go to the error sink if one is
    /// configured and are otherwise only logged.
    pub async fn sweep(&mut self) {
        let mut idle = ticker(self.config.sweep_interval);

        tracing::info!(
            "Sweeper started (sweep interval: {:?}, batch interval: {:?})",
            self.config.sweep_interval,
            self.config.batch_interval
        );

        loop {
            tokio::select! {
                biased;
                _ = self.stop_rx.recv() => {
                    tracing::info!("Stop signal received, stopping sweeper");
                    break;
                }
                _ = idle.tick() => {
                    match self.campaign().await {
                        CampaignEnd::Stopped => {
                            tracing::info!("Stop signal received mid-campaign, stopping sweeper");
                            break;
                        }
                        CampaignEnd::Exhausted | CampaignEnd::Abandoned => idle.reset(),
                    }
                }
            }
        }

        tracing::info!("Sweeper stopped. Final metrics:\n{}", self.metrics.summary());
    }

    async fn campaign(&mut self) -> CampaignEnd {
        self.metrics.record_campaign();
        tracing::debug!("Starting sweep campaign {}", self.metrics.campaigns_started);

        let mut batches = ticker(self.config.batch_interval);
        let mut deleted: u64 = 0;

        loop {
            if self.config.stop_between_batches {
                tokio::select! {
                    biased;
                    _ = self.stop_rx.recv() => return CampaignEnd::Stopped,
                    _ = batches.tick() => {}
                }
            } else {
                batches.tick().await;
            }

            let outcome = self.run_batch();
            let affected = match outcome {
                Ok(affected) => affected,
                Err(e) => {
                    tracing::warn!("Sweep campaign abandoned after {} rows: {}", deleted, e);
                    self.metrics.record_abandoned();
                    send_error(self.config.error_sink.as_ref(), e).await;
                    return CampaignEnd::Abandoned;
                }
            };

            self.metrics.record_batch(affected);
            send_affected(self.config.affected_sink.as_ref(), affected).await;

            if affected == 0 {
                self.metrics.record_completed();
                tracing::info!("Sweep campaign completed: {} rows deleted", deleted);
                return CampaignEnd::Exhausted;
            }

            deleted += affected;
            tracing::debug!(affected, deleted, "Batch deleted rows");
        }
    }

    fn run_batch(&self) -> Result<u64, SweepError> {
        let statement = (self.config.delete_factory)();
        tracing::trace!(%statement, "Executing delete batch");

        let result = self
            .db
            .exec(&statement.sql, &statement.params)
            .map_err(|e| SweepError::Execute(e.to_string()))?;

        result
            .rows_affected()
            .map_err(|e| SweepError::RowsAffected(e.to_string()))
    }
}

async fn send_error(sink: Option<&mpsc::Sender<SweepError>>, err: SweepError) {
    if let Some(sink) = sink {
        if sink.send(err).await.is_err() {
            tracing::debug!("Error sink closed, dropping report");
        }
    }
}

async fn send_affected(sink: Option<&mpsc::Sender<u64>>, affected: u64) {
    if let Some(sink) = sink {
        if sink.send(affected).await.is_err() {
            tracing::debug!("Affected sink closed, dropping report");
        }
    }
}

/// Requests termination of a [`Sweeper`] run loop
///
/// One signal ends one run. A signal sent while no loop is running is kept
/// and ends the next run at its first idle check.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: mpsc::Sender<()>,
}

impl StopHandle {
    /// Send a stop signal, waiting if one is already pending
    ///
    /// Returns [`SweepError::Stopped`] if the sweeper has been dropped.
    pub async fn stop(&self) -> Result<(), SweepError> {
        self.tx.send(()).await.map_err(|_| SweepError::Stopped)
    }

    /// Send a stop signal without waiting
    pub fn try_stop(&self) -> Result<(), SweepError> {
        self.tx.try_send(()).map_err(|e| match e {
            TrySendError::Full(()) => SweepError::StopPending,
            TrySendError::Closed(()) => SweepError::Stopped,
        })
    }
}
