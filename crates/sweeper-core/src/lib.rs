//! Sweeper Core
//!
//! Periodic batch deletion for append-heavy tables.
//!
//! # Overview
//!
//! A [`Sweeper`] keeps a table from growing without bound while never issuing
//! one huge delete:
//! - **Campaigns**: every sweep interval it starts draining the table
//! - **Batches**: within a campaign it runs one bounded delete per batch interval
//! - **Termination**: a batch that affects zero rows ends the campaign
//! - **Reporting**: affected counts and failures go to optional channels
//!
//! What to delete is decided by the caller: the configuration carries a
//! factory that builds a fresh [`DeleteStatement`](sweeper_domain::DeleteStatement)
//! for every batch. The database handle is any [`Database`](sweeper_domain::Database).
//!
//! ## Campaign lifecycle
//!
//! | State | Waits on | Leaves when |
//! |-------|----------|-------------|
//! | **Idle** | sweep interval, stop signal | tick (→ Sweeping) or stop (→ Terminated) |
//! | **Sweeping** | batch interval | zero rows or an error (→ Idle) |
//! | **Terminated** | - | never |
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use sweeper_core::{SweepConfig, Sweeper};
//! use sweeper_domain::DeleteStatement;
//! use sweeper_store::SqliteDatabase;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = SqliteDatabase::open("app.db")?;
//!     let (error_tx, mut error_rx) = mpsc::channel(16);
//!
//!     let config = SweepConfig::new(Duration::from_secs(300), Duration::from_secs(1), || {
//!         DeleteStatement::new(
//!             "DELETE FROM session WHERE rowid IN \
//!              (SELECT rowid FROM session WHERE expires_at < ?1 LIMIT 500)",
//!         )
//!         .bind(1_700_000_000_i64)
//!     })
//!     .with_error_sink(error_tx);
//!
//!     let mut sweeper = Sweeper::new(db, config);
//!     let stop = sweeper.stop_handle();
//!     let task = tokio::spawn(async move { sweeper.sweep().await });
//!
//!     if let Some(err) = error_rx.recv().await {
//!         eprintln!("sweep failed: {err}");
//!     }
//!
//!     stop.stop().await?;
//!     task.await?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! Timing can be loaded from TOML through [`SweepSchedule`]:
//!
//! ```toml
//! sweep_interval_ms = 60000
//! batch_interval_ms = 1000
//! stop_between_batches = false
//! ```
//!
//! # Sinks
//!
//! Reports are awaited sends. A full sink stalls the loop, so drain sinks
//! promptly or buffer them. Without an error sink, failures are logged and
//! otherwise dropped.

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod sweeper;

pub use config::{DeleteFactory, SweepConfig, SweepPreset, SweepSchedule};
pub use error::SweepError;
pub use metrics::SweepMetrics;
pub use sweeper::{StopHandle, Sweeper};
