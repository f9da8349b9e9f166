//! Error types for sweep operations

use thiserror::Error;

/// Errors that can occur while sweeping
///
/// `Execute` and `RowsAffected` are never returned from the run loop; they are
/// delivered through the configured error sink.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SweepError {
    /// The delete statement failed to execute
    #[error("Execution error: {0}")]
    Execute(String),

    /// The statement ran but its affected row count could not be read
    #[error("Rows affected error: {0}")]
    RowsAffected(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A stop signal is already waiting to be consumed
    #[error("Stop signal already pending")]
    StopPending,

    /// The sweeper has been dropped
    #[error("Sweeper stopped")]
    Stopped,
}
