use crate::{
    core::identifiers::RunId,
    import::{status::ImportStatus, summary::ImportSummary, totals::ImportTotals},
    records::batch::BatchResult,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Point-in-time view of an import run.
///
/// The scheduler is the only writer; everyone else sees clones of this struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportState {
    pub run_id: Option<RunId>,
    pub status: ImportStatus,
    /// Number of batches finished (successfully or not). `0..=total_batches`.
    pub current_batch: usize,
    pub total_batches: usize,
    pub processed_records: usize,
    pub total_records: usize,
    pub totals: ImportTotals,
    pub error_log: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ImportState {
    /// Fresh state for a run that is about to dispatch its first batch.
    pub fn running(run_id: RunId, total_records: usize, total_batches: usize) -> Self {
        ImportState {
            run_id: Some(run_id),
            status: ImportStatus::Running,
            total_batches,
            total_records,
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn merge(&mut self, result: &BatchResult) {
        self.totals.merge(result);
        self.error_log.extend(result.errors.iter().cloned());
    }

    pub fn error_count(&self) -> usize {
        self.error_log.len()
    }

    /// The `limit` most recent error messages, oldest first.
    pub fn error_tail(&self, limit: usize) -> &[String] {
        let start = self.error_log.len().saturating_sub(limit);
        &self.error_log[start..]
    }

    pub fn percentage(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        self.processed_records as f64 * 100.0 / self.total_records as f64
    }

    pub fn summary(&self) -> ImportSummary {
        let duration_ms = match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds().max(0) as u64),
            _ => None,
        };

        ImportSummary {
            run_id: self
                .run_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            status: self.status,
            total_records: self.total_records,
            processed_records: self.processed_records,
            total_batches: self.total_batches,
            completed_batches: self.current_batch,
            inserted: self.totals.inserted,
            skipped: self.totals.skipped,
            counters: self.totals.counters.clone(),
            error_count: self.error_count(),
            duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_state_starts_from_zero() {
        let state = ImportState::running(RunId::from("run-1"), 250, 3);
        assert_eq!(state.status, ImportStatus::Running);
        assert_eq!(state.current_batch, 0);
        assert_eq!(state.processed_records, 0);
        assert!(state.error_log.is_empty());
        assert!(state.started_at.is_some());
    }

    #[test]
    fn error_tail_keeps_most_recent_messages() {
        let mut state = ImportState::default();
        for i in 1..=5 {
            state.error_log.push(format!("Batch {i}: boom"));
        }

        assert_eq!(state.error_tail(2), ["Batch 4: boom", "Batch 5: boom"]);
        assert_eq!(state.error_tail(10).len(), 5);
        assert!(state.error_tail(0).is_empty());
    }

    #[test]
    fn merge_appends_response_errors() {
        let mut state = ImportState::default();
        state.merge(&BatchResult::new(3, 1).with_error("row 2: invalid email"));

        assert_eq!(state.totals.inserted, 3);
        assert_eq!(state.error_log, vec!["row 2: invalid email".to_string()]);
    }

    #[test]
    fn summary_reflects_counts() {
        let mut state = ImportState::running(RunId::from("run-7"), 10, 2);
        state.merge(&BatchResult::new(8, 2).with_counter("points", 80));
        state.current_batch = 2;
        state.processed_records = 10;
        state.status = ImportStatus::Completed;
        state.finished_at = state.started_at;

        let summary = state.summary();
        assert_eq!(summary.run_id, "run-7");
        assert_eq!(summary.inserted, 8);
        assert_eq!(summary.counters.get("points"), Some(&80));
        assert_eq!(summary.completed_batches, 2);
        assert_eq!(summary.duration_ms, Some(0));
        assert_eq!(state.percentage(), 100.0);
    }
}
