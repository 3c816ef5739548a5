use chrono::Utc;
use model::{
    core::identifiers::RunId,
    import::{state::ImportState, status::ImportStatus},
    records::batch::BatchResult,
};
use std::sync::Arc;
use tokio::sync::watch;

/// Holds the single mutable [`ImportState`] of an importer and publishes a
/// snapshot after every mutation.
///
/// There is exactly one writer at a time (the scheduler of the active run), so
/// every snapshot is consistent with the last completed step. Observers either
/// poll [`ProgressAggregator::snapshot`] or follow a [`watch::Receiver`].
#[derive(Clone)]
pub struct ProgressAggregator {
    tx: Arc<watch::Sender<ImportState>>,
}

impl ProgressAggregator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ImportState::default());
        ProgressAggregator { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> ImportState {
        self.tx.borrow().clone()
    }

    pub fn status(&self) -> ImportStatus {
        self.tx.borrow().status
    }

    pub fn subscribe(&self) -> watch::Receiver<ImportState> {
        self.tx.subscribe()
    }

    /// Replaces whatever the previous run left behind with a fresh running
    /// state: counters, error log and batch position all start from zero.
    pub fn begin(&self, run_id: RunId, total_records: usize, total_batches: usize) {
        self.tx
            .send_replace(ImportState::running(run_id, total_records, total_batches));
    }

    pub fn set_status(&self, status: ImportStatus) {
        self.tx.send_if_modified(|state| {
            if state.status == status {
                return false;
            }
            state.status = status;
            true
        });
    }

    /// Records a transport failure for the zero-based `batch_index`.
    pub fn record_failure(&self, batch_index: usize, message: &str) {
        self.tx.send_modify(|state| {
            state
                .error_log
                .push(format!("Batch {}: {message}", batch_index + 1));
        });
    }

    /// Adds a successful batch's counters and row errors to the totals.
    pub fn merge(&self, result: &BatchResult) {
        self.tx.send_modify(|state| state.merge(result));
    }

    /// Moves the run past a finished batch. The status is left alone: only
    /// [`ProgressAggregator::finish`] may publish a terminal status.
    pub fn advance(&self, completed_batches: usize, processed_records: usize) {
        self.tx.send_modify(|state| {
            state.current_batch = completed_batches.min(state.total_batches);
            state.processed_records = processed_records.max(state.processed_records);
        });
    }

    /// Final transition of `run_id` to a terminal status, returning the final
    /// state. Returns `None` without touching anything if the aggregator has
    /// already been handed to another run.
    pub fn finish(&self, run_id: &RunId, status: ImportStatus) -> Option<ImportState> {
        let mut finished = None;
        self.tx.send_if_modified(|state| {
            if state.run_id.as_ref() != Some(run_id) {
                return false;
            }
            state.status = status;
            state.finished_at = Some(Utc::now());
            finished = Some(state.clone());
            true
        });
        finished
    }

    pub fn error_tail(&self, limit: usize) -> Vec<String> {
        self.tx.borrow().error_tail(limit).to_vec()
    }
}

impl Default for ProgressAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(total_records: usize, total_batches: usize) -> ProgressAggregator {
        let progress = ProgressAggregator::new();
        progress.begin(RunId::from("run-test"), total_records, total_batches);
        progress
    }

    #[test]
    fn starts_idle() {
        let progress = ProgressAggregator::new();
        assert_eq!(progress.status(), ImportStatus::Idle);
        assert_eq!(progress.snapshot(), ImportState::default());
    }

    #[test]
    fn failures_are_numbered_from_one() {
        let progress = started(250, 3);
        progress.record_failure(1, "HTTP 500: boom");
        assert_eq!(progress.snapshot().error_log, vec!["Batch 2: HTTP 500: boom"]);
    }

    #[test]
    fn last_batch_stays_running_until_finished() {
        let progress = started(250, 3);
        progress.merge(&BatchResult::new(100, 0));
        progress.advance(1, 100);
        assert_eq!(progress.status(), ImportStatus::Running);

        progress.advance(3, 250);
        let state = progress.snapshot();
        assert_eq!(state.status, ImportStatus::Running);
        assert_eq!(state.current_batch, 3);
        assert_eq!(state.processed_records, 250);
        assert!(state.finished_at.is_none());

        let finished = progress
            .finish(&RunId::from("run-test"), ImportStatus::Completed)
            .unwrap();
        assert_eq!(finished.status, ImportStatus::Completed);
        assert!(finished.finished_at.is_some());
        assert_eq!(progress.snapshot(), finished);
    }

    #[test]
    fn finish_ignores_a_superseded_run() {
        let progress = started(10, 1);
        progress.begin(RunId::from("run-next"), 4, 2);

        assert!(
            progress
                .finish(&RunId::from("run-test"), ImportStatus::Completed)
                .is_none()
        );
        let state = progress.snapshot();
        assert_eq!(state.status, ImportStatus::Running);
        assert_eq!(state.run_id, Some(RunId::from("run-next")));
        assert!(state.finished_at.is_none());
    }

    #[test]
    fn processed_records_never_decrease() {
        let progress = started(10, 2);
        progress.advance(1, 5);
        progress.advance(1, 3);
        assert_eq!(progress.snapshot().processed_records, 5);
    }

    #[test]
    fn begin_resets_previous_run() {
        let progress = started(10, 1);
        progress.merge(&BatchResult::new(10, 0).with_error("row 1: bad"));
        progress.advance(1, 10);
        progress.finish(&RunId::from("run-test"), ImportStatus::Completed);

        progress.begin(RunId::from("run-next"), 4, 2);
        let state = progress.snapshot();
        assert_eq!(state.status, ImportStatus::Running);
        assert_eq!(state.totals.inserted, 0);
        assert!(state.error_log.is_empty());
        assert_eq!(state.current_batch, 0);
        assert!(state.finished_at.is_none());
        assert_eq!(state.run_id, Some(RunId::from("run-next")));
    }

    #[tokio::test]
    async fn subscribers_see_status_changes() {
        let progress = started(10, 2);
        let mut rx = progress.subscribe();

        progress.set_status(ImportStatus::Paused);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().status, ImportStatus::Paused);

        progress.set_status(ImportStatus::Paused);
        assert!(!rx.has_changed().unwrap());
    }
}
