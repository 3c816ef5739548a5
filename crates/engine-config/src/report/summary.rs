use chrono::{DateTime, Utc};
use engine_core::metrics::MetricsSnapshot;
use model::import::{state::ImportState, summary::ImportSummary};
use serde::Serialize;

/// Final report of one import run, as printed or written by the CLI.
#[derive(Serialize, Debug, Clone)]
pub struct ImportReport {
    pub target: String,
    pub summary: ImportSummary,
    /// Most recent error messages, oldest first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recent_errors: Vec<String>,
    pub metrics: MetricsSnapshot,
    pub generated_at: DateTime<Utc>,
}

impl ImportReport {
    pub fn new(
        target: impl Into<String>,
        state: &ImportState,
        error_tail: usize,
        metrics: MetricsSnapshot,
    ) -> Self {
        ImportReport {
            target: target.into(),
            summary: state.summary(),
            recent_errors: state.error_tail(error_tail).to_vec(),
            metrics,
            generated_at: Utc::now(),
        }
    }
}
