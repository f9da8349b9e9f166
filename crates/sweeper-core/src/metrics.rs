//! Metrics collection for sweep operations

/// Counters kept by a [`Sweeper`](crate::Sweeper) across its run loop
///
/// A campaign that ends with a zero-row batch is *completed*; one cut short
/// by an execution or row count error is *abandoned*.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepMetrics {
    /// Campaigns started
    pub campaigns_started: usize,

    /// Campaigns that drained every matching row
    pub campaigns_completed: usize,

    /// Campaigns ended early by an error
    pub campaigns_abandoned: usize,

    /// Delete statements that ran and reported a row count
    pub batches: usize,

    /// Rows removed across all batches
    pub rows_deleted: u64,

    /// Execution and row count failures
    pub errors: usize,
}

impl SweepMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of a campaign
    pub fn record_campaign(&mut self) {
        self.campaigns_started += 1;
    }

    /// Record a successful batch
    pub fn record_batch(&mut self, affected: u64) {
        self.batches += 1;
        self.rows_deleted += affected;
    }

    /// Record a campaign ending on a zero-row batch
    pub fn record_completed(&mut self) {
        self.campaigns_completed += 1;
    }

    /// Record a campaign cut short by an error
    pub fn record_abandoned(&mut self) {
        self.campaigns_abandoned += 1;
        self.errors += 1;
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let lines = [
            "Sweeper Metrics Summary".to_string(),
            "=======================".to_string(),
            format!(
                "Campaigns: {} started, {} completed, {} abandoned",
                self.campaigns_started, self.campaigns_completed, self.campaigns_abandoned
            ),
            format!("Batches: {}", self.batches),
            format!("Rows deleted: {}", self.rows_deleted),
            format!("Errors: {}", self.errors),
        ];

        lines.join("\n")
    }
}
