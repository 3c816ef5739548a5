use crate::{core::identifiers::RunId, import::summary::ImportSummary};
use std::fmt::Debug;

/// A trait for events that can be published on the EventBus.
pub trait Event: Send + Sync + Debug + 'static {
    /// Returns a unique identifier for this event type.
    fn event_type(&self) -> &'static str;
}

/// Emitted when the scheduler begins walking the batches of a run.
#[derive(Debug, Clone)]
pub struct RunStarted {
    pub run_id: RunId,
    pub target: String,
    pub total_records: usize,
    pub total_batches: usize,
    pub has_header: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for RunStarted {
    fn event_type(&self) -> &'static str {
        "import.started"
    }
}

/// Emitted when the scheduler observes a pause request at a checkpoint.
#[derive(Debug, Clone)]
pub struct RunPaused {
    pub run_id: RunId,
    /// One-based number of the batch that will be dispatched on resume.
    pub next_batch: usize,
    pub processed_records: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for RunPaused {
    fn event_type(&self) -> &'static str {
        "import.paused"
    }
}

/// Emitted when a paused run continues.
#[derive(Debug, Clone)]
pub struct RunResumed {
    pub run_id: RunId,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for RunResumed {
    fn event_type(&self) -> &'static str {
        "import.resumed"
    }
}

/// Emitted after a batch call returned and its counters were merged.
#[derive(Debug, Clone)]
pub struct BatchCompleted {
    pub run_id: RunId,
    /// One-based batch number.
    pub batch: usize,
    pub rows: usize,
    pub processed_records: usize,
    pub inserted: u64,
    pub skipped: u64,
    pub errors: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for BatchCompleted {
    fn event_type(&self) -> &'static str {
        "batch.completed"
    }
}

/// Emitted when the batch call itself failed; nothing from it was merged.
#[derive(Debug, Clone)]
pub struct BatchFailed {
    pub run_id: RunId,
    /// One-based batch number.
    pub batch: usize,
    pub rows: usize,
    pub processed_records: usize,
    pub error: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for BatchFailed {
    fn event_type(&self) -> &'static str {
        "batch.failed"
    }
}

/// Emitted once when every batch of a run has been attempted.
#[derive(Debug, Clone)]
pub struct RunCompleted {
    pub summary: ImportSummary,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for RunCompleted {
    fn event_type(&self) -> &'static str {
        "import.completed"
    }
}

/// Emitted once when a run exits early because of a stop request.
#[derive(Debug, Clone)]
pub struct RunStopped {
    pub summary: ImportSummary,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for RunStopped {
    fn event_type(&self) -> &'static str {
        "import.stopped"
    }
}
