use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One unit of work handed to the external batch processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRequest {
    /// Identity of the dataset or account the rows are imported into.
    pub target: String,
    /// Zero-based position of the batch within the run.
    pub batch_index: usize,
    /// Number of data lines in the payload (header excluded).
    pub row_count: usize,
    pub payload: String,
}

impl BatchRequest {
    /// One-based batch number, as shown to operators.
    pub fn number(&self) -> usize {
        self.batch_index + 1
    }
}

/// Counters and row-level errors reported back for a single batch.
///
/// Transient: merged into the run totals and then dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub inserted: u64,
    pub skipped: u64,
    /// Domain specific counters (e.g. `cards_linked`, `points_awarded`).
    #[serde(default)]
    pub counters: BTreeMap<String, u64>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl BatchResult {
    pub fn new(inserted: u64, skipped: u64) -> Self {
        BatchResult {
            inserted,
            skipped,
            ..Default::default()
        }
    }

    pub fn with_counter(mut self, name: impl Into<String>, value: u64) -> Self {
        *self.counters.entry(name.into()).or_default() += value;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
