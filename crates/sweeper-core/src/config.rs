//! Configuration for sweep operations
//!
//! [`SweepConfig`] is what a [`Sweeper`](crate::Sweeper) runs with: two
//! intervals, the delete factory and the optional report sinks.
//! [`SweepSchedule`] is the serializable subset loaded from config files.

use crate::SweepError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sweeper_domain::DeleteStatement;
use tokio::sync::mpsc;

/// Produces the delete statement for each batch
///
/// Re-invoked for every batch, so it may embed a fixed limit and cutoff or
/// compute fresh ones (e.g. "now minus retention") on each call.
pub type DeleteFactory = Arc<dyn Fn() -> DeleteStatement + Send + Sync>;

/// Runtime configuration for a [`Sweeper`](crate::Sweeper)
///
/// Sinks are plain tokio channels. When a sink is set, every report is an
/// awaited send: the run loop stalls while the channel is full. Callers must
/// drain sinks promptly or size them generously.
///
/// A zero interval is treated as one millisecond; intervals beyond about
/// 30 years, including `Duration::MAX`, are capped there.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use sweeper_core::SweepConfig;
/// use sweeper_domain::DeleteStatement;
/// use tokio::sync::mpsc;
///
/// let (affected_tx, _affected_rx) = mpsc::channel(16);
/// let config = SweepConfig::new(
///     Duration::from_secs(60),
///     Duration::from_millis(500),
///     || DeleteStatement::new("DELETE FROM reservation WHERE rowid IN (SELECT rowid FROM reservation LIMIT 1000)"),
/// )
/// .with_affected_sink(affected_tx);
///
/// assert!(config.error_sink.is_none());
/// ```
#[derive(Clone)]
pub struct SweepConfig {
    /// Wait between the end of one campaign and the start of the next
    pub sweep_interval: Duration,

    /// Wait between successive batches within one campaign
    pub batch_interval: Duration,

    /// Receives execution and row count failures
    pub error_sink: Option<mpsc::Sender<SweepError>>,

    /// Receives the row count removed by each batch
    pub affected_sink: Option<mpsc::Sender<u64>>,

    /// Deletion policy
    pub delete_factory: DeleteFactory,

    /// Also honor the stop signal while waiting between batches
    pub stop_between_batches: bool,
}

impl SweepConfig {
    /// Create a configuration with no sinks
    pub fn new<F>(sweep_interval: Duration, batch_interval: Duration, delete_factory: F) -> Self
    where
        F: Fn() -> DeleteStatement + Send + Sync + 'static,
    {
        Self {
            sweep_interval,
            batch_interval,
            error_sink: None,
            affected_sink: None,
            delete_factory: Arc::new(delete_factory),
            stop_between_batches: false,
        }
    }

    /// Report failures on `sink`
    pub fn with_error_sink(mut self, sink: mpsc::Sender<SweepError>) -> Self {
        self.error_sink = Some(sink);
        self
    }

    /// Report per-batch affected counts on `sink`
    pub fn with_affected_sink(mut self, sink: mpsc::Sender<u64>) -> Self {
        self.affected_sink = Some(sink);
        self
    }

    /// Poll the stop signal between batches as well as between campaigns
    pub fn stop_between_batches(mut self, enabled: bool) -> Self {
        self.stop_between_batches = enabled;
        self
    }
}

impl fmt::Debug for SweepConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SweepConfig")
            .field("sweep_interval", &self.sweep_interval)
            .field("batch_interval", &self.batch_interval)
            .field("error_sink", &self.error_sink.is_some())
            .field("affected_sink", &self.affected_sink.is_some())
            .field("stop_between_batches", &self.stop_between_batches)
            .finish_non_exhaustive()
    }
}

/// Serializable timing settings
///
/// # Examples
///
/// ```
/// use sweeper_core::SweepSchedule;
///
/// // Default: one campaign a minute, one batch a second
/// let schedule = SweepSchedule::default();
/// assert_eq!(schedule.sweep_interval_ms, 60_000);
///
/// // Aggressive: for tables that grow fast
/// let schedule = SweepSchedule::aggressive();
/// assert_eq!(schedule.batch_interval_ms, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSchedule {
    /// Wait between campaigns (in milliseconds)
    /// Default: 60000 (one minute)
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,

    /// Wait between batches (in milliseconds)
    /// Default: 1000
    #[serde(default = "default_batch_interval_ms")]
    pub batch_interval_ms: u64,

    /// Honor stop requests between batches
    /// Default: false
    #[serde(default)]
    pub stop_between_batches: bool,
}

fn default_sweep_interval_ms() -> u64 {
    60_000
}

fn default_batch_interval_ms() -> u64 {
    1_000
}

impl Default for SweepSchedule {
    fn default() -> Self {
        Self {
            sweep_interval_ms: default_sweep_interval_ms(),
            batch_interval_ms: default_batch_interval_ms(),
            stop_between_batches: false,
        }
    }
}

impl SweepSchedule {
    /// Frequent campaigns with tight batches
    ///
    /// - Sweep interval: 10 seconds
    /// - Batch interval: 100 milliseconds
    pub fn aggressive() -> Self {
        Self {
            sweep_interval_ms: 10_000,
            batch_interval_ms: 100,
            stop_between_batches: false,
        }
    }

    /// Rare campaigns with gentle batches, for busy primaries
    ///
    /// - Sweep interval: 1 hour
    /// - Batch interval: 5 seconds
    pub fn lenient() -> Self {
        Self {
            sweep_interval_ms: 3_600_000,
            batch_interval_ms: 5_000,
            stop_between_batches: false,
        }
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Get batch interval as Duration
    pub fn batch_interval(&self) -> Duration {
        Duration::from_millis(self.batch_interval_ms)
    }

    /// Reject zero intervals
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.sweep_interval_ms == 0 {
            return Err(SweepError::Config("sweep_interval_ms must be greater than zero".to_string()));
        }
        if self.batch_interval_ms == 0 {
            return Err(SweepError::Config("batch_interval_ms must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Build a [`SweepConfig`] around `delete_factory`
    pub fn into_config<F>(self, delete_factory: F) -> Result<SweepConfig, SweepError>
    where
        F: Fn() -> DeleteStatement + Send + Sync + 'static,
    {
        self.validate()?;
        Ok(
            SweepConfig::new(self.sweep_interval(), self.batch_interval(), delete_factory)
                .stop_between_batches(self.stop_between_batches),
        )
    }
}

/// Named [`SweepSchedule`] starting points for config files and flags
///
/// ```
/// use sweeper_core::{SweepPreset, SweepSchedule};
///
/// let preset: SweepPreset = "lenient".parse().unwrap();
/// assert_eq!(preset.schedule(), SweepSchedule::lenient());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepPreset {
    /// [`SweepSchedule::default`]
    #[default]
    Default,
    /// [`SweepSchedule::aggressive`]
    Aggressive,
    /// [`SweepSchedule::lenient`]
    Lenient,
}

impl SweepPreset {
    /// The schedule this preset names
    pub fn schedule(self) -> SweepSchedule {
        match self {
            SweepPreset::Default => SweepSchedule::default(),
            SweepPreset::Aggressive => SweepSchedule::aggressive(),
            SweepPreset::Lenient => SweepSchedule::lenient(),
        }
    }
}

impl fmt::Display for SweepPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepPreset::Default => write!(f, "default"),
            SweepPreset::Aggressive => write!(f, "aggressive"),
            SweepPreset::Lenient => write!(f, "lenient"),
        }
    }
}

impl FromStr for SweepPreset {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(SweepPreset::Default),
            "aggressive" => Ok(SweepPreset::Aggressive),
            "lenient" => Ok(SweepPreset::Lenient),
            other => Err(SweepError::Config(format!(
                "unknown preset '{}' (expected default, aggressive or lenient)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> DeleteStatement {
        DeleteStatement::new("DELETE FROM t").bind(1_i64)
    }

    #[test]
    fn test_default_schedule() {
        let schedule = SweepSchedule::default();
        assert_eq!(schedule.sweep_interval(), Duration::from_secs(60));
        assert_eq!(schedule.batch_interval(), Duration::from_secs(1));
        assert!(!schedule.stop_between_batches);
    }

    #[test]
    fn test_presets_ordering() {
        let default = SweepSchedule::default();
        assert!(SweepSchedule::aggressive().sweep_interval_ms < default.sweep_interval_ms);
        assert!(SweepSchedule::lenient().sweep_interval_ms > default.sweep_interval_ms);
        assert!(SweepSchedule::lenient().batch_interval_ms > default.batch_interval_ms);
    }

    #[test]
    fn test_validate_rejects_zero() {
        let schedule = SweepSchedule {
            batch_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(schedule.validate(), Err(SweepError::Config(_))));

        let schedule = SweepSchedule {
            sweep_interval_ms: 0,
            ..Default::default()
        };
        assert!(schedule.into_config(factory).is_err());
    }

    #[test]
    fn test_into_config() {
        let schedule = SweepSchedule {
            sweep_interval_ms: 200,
            batch_interval_ms: 100,
            stop_between_batches: true,
        };
        let config = schedule.into_config(factory).unwrap();

        assert_eq!(config.sweep_interval, Duration::from_millis(200));
        assert_eq!(config.batch_interval, Duration::from_millis(100));
        assert!(config.stop_between_batches);
        assert!(config.error_sink.is_none());
        assert!(config.affected_sink.is_none());
        assert_eq!((config.delete_factory)(), factory());
    }

    #[test]
    fn test_sinks_attach() {
        let (err_tx, _err_rx) = mpsc::channel(1);
        let (aff_tx, _aff_rx) = mpsc::channel(1);
        let config = SweepConfig::new(Duration::from_secs(1), Duration::from_secs(1), factory)
            .with_error_sink(err_tx)
            .with_affected_sink(aff_tx);

        assert!(config.error_sink.is_some());
        assert!(config.affected_sink.is_some());

        let debug = format!("{:?}", config);
        assert!(debug.contains("error_sink: true"));
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let schedule: SweepSchedule = serde_json::from_str(r#"{"batch_interval_ms": 250}"#).unwrap();
        assert_eq!(schedule.batch_interval_ms, 250);
        assert_eq!(schedule.sweep_interval_ms, 60_000);
        assert!(!schedule.stop_between_batches);
    }

    #[test]
    fn test_serde_roundtrip() {
        let schedule = SweepSchedule::lenient();
        let serialized = serde_json::to_string(&schedule).unwrap();
        let deserialized: SweepSchedule = serde_json::from_str(&serialized).unwrap();
        assert_eq!(schedule, deserialized);
    }

    #[test]
    fn test_preset_names() {
        assert_eq!("aggressive".parse::<SweepPreset>().unwrap(), SweepPreset::Aggressive);
        assert_eq!("Lenient".parse::<SweepPreset>().unwrap(), SweepPreset::Lenient);
        assert!(matches!("fast".parse::<SweepPreset>(), Err(SweepError::Config(_))));

        for preset in [SweepPreset::Default, SweepPreset::Aggressive, SweepPreset::Lenient] {
            assert_eq!(preset.to_string().parse::<SweepPreset>().unwrap(), preset);
        }
    }

    #[test]
    fn test_preset_schedules() {
        assert_eq!(SweepPreset::default().schedule(), SweepSchedule::default());
        assert_eq!(SweepPreset::Aggressive.schedule(), SweepSchedule::aggressive());

        let preset: SweepPreset = serde_json::from_str(r#""lenient""#).unwrap();
        assert_eq!(preset.schedule().batch_interval_ms, 5_000);
    }
}
