use chrono::Utc;
use connectors::{error::ProcessorError, processor::BatchProcessor};
use engine_core::{
    control::ControlChannel, event_bus::bus::EventBus, metrics::Metrics,
    plan::batch::BatchPlan, progress::ProgressAggregator,
};
use model::{
    core::identifiers::RunId,
    events::{
        BatchCompleted, BatchFailed, RunCompleted, RunPaused, RunResumed, RunStarted, RunStopped,
    },
    import::{state::ImportState, status::ImportStatus},
    records::{
        batch::{BatchRequest, BatchResult},
        record_set::RawRecordSet,
    },
};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod config;

pub use config::SchedulerConfig;

/// Walks the batches of one run in ascending order and feeds them to the
/// processor, one call at a time.
///
/// The only suspension points are the processor call, the pause-wait and the
/// inter-batch delay. Control flags are read at the top of every batch and
/// inside the pause-wait; a stop never cancels a call that is already in
/// flight, its result is merged before the loop exits.
pub struct BatchScheduler {
    run_id: RunId,
    target: String,
    records: RawRecordSet,
    plan: BatchPlan,
    processor: Arc<dyn BatchProcessor>,
    control: ControlChannel,
    progress: ProgressAggregator,
    events: EventBus,
    metrics: Metrics,
    config: SchedulerConfig,
}

impl BatchScheduler {
    pub fn new(
        run_id: RunId,
        target: impl Into<String>,
        records: RawRecordSet,
        plan: BatchPlan,
        processor: Arc<dyn BatchProcessor>,
    ) -> Self {
        Self {
            run_id,
            target: target.into(),
            records,
            plan,
            processor,
            control: ControlChannel::new(),
            progress: ProgressAggregator::new(),
            events: EventBus::new(),
            metrics: Metrics::new(),
            config: SchedulerConfig::default(),
        }
    }

    pub fn with_control(mut self, control: ControlChannel) -> Self {
        self.control = control;
        self
    }

    pub fn with_progress(mut self, progress: ProgressAggregator) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Seeds the aggregator with a fresh running state for this run.
    pub fn begin(&self) {
        self.progress.begin(
            self.run_id.clone(),
            self.plan.total_records(),
            self.plan.total_batches(),
        );
    }

    /// Executes the batch loop to completion or until stopped and returns the
    /// final state. Per-batch failures are recorded, never returned.
    pub async fn run(self) -> ImportState {
        let total_batches = self.plan.total_batches();

        info!(
            run_id = %self.run_id,
            target = %self.target,
            processor = self.processor.name(),
            records = self.plan.total_records(),
            batches = total_batches,
            batch_size = self.plan.batch_size(),
            has_header = self.records.has_header,
            "Import started"
        );
        self.events
            .publish(RunStarted {
                run_id: self.run_id.clone(),
                target: self.target.clone(),
                total_records: self.plan.total_records(),
                total_batches,
                has_header: self.records.has_header,
                timestamp: Utc::now(),
            })
            .await;

        let mut stopped = false;
        for batch_index in 0..total_batches {
            if !self.checkpoint(batch_index).await {
                stopped = true;
                break;
            }
            self.progress.set_status(ImportStatus::Running);

            let range = self.plan.range(batch_index);
            let last = self.plan.is_last(batch_index);
            let request = BatchRequest {
                target: self.target.clone(),
                batch_index,
                row_count: range.len(),
                payload: self.records.payload(range.clone()),
            };

            match self.dispatch(&request).await {
                Ok(result) => {
                    self.metrics.increment_succeeded();
                    self.progress.merge(&result);
                    self.progress.advance(batch_index + 1, range.end);
                    self.batch_completed(&request, &result).await;
                }
                Err(e) => {
                    self.metrics.increment_failed();
                    let message = e.to_string();
                    self.progress.record_failure(batch_index, &message);
                    self.progress.advance(batch_index + 1, range.end);
                    self.batch_failed(&request, message).await;
                }
            }

            if !last && !self.inter_batch_delay().await {
                stopped = true;
                break;
            }
        }

        let status = if stopped {
            ImportStatus::Stopped
        } else {
            ImportStatus::Completed
        };
        let Some(state) = self.progress.finish(&self.run_id, status) else {
            warn!(run_id = %self.run_id, "Progress already belongs to a newer run");
            return self.progress.snapshot();
        };
        self.announce_finish(&state).await;
        state
    }

    /// Honours pending pause/stop requests before a batch is dispatched.
    /// Returns `false` when the run must end without dispatching.
    async fn checkpoint(&self, batch_index: usize) -> bool {
        if self.control.is_stopped() {
            info!(
                run_id = %self.run_id,
                next_batch = batch_index + 1,
                "Stop requested, skipping remaining batches"
            );
            return false;
        }

        if !self.control.is_paused() {
            return true;
        }

        self.progress.set_status(ImportStatus::Paused);
        let processed_records = self.progress.snapshot().processed_records;
        info!(
            run_id = %self.run_id,
            next_batch = batch_index + 1,
            processed = processed_records,
            "Import paused"
        );
        self.events
            .publish(RunPaused {
                run_id: self.run_id.clone(),
                next_batch: batch_index + 1,
                processed_records,
                timestamp: Utc::now(),
            })
            .await;

        while self.control.is_paused() && !self.control.is_stopped() {
            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = self.control.stopped() => {}
            }
        }

        if self.control.is_stopped() {
            info!(run_id = %self.run_id, "Stop requested while paused");
            return false;
        }

        info!(run_id = %self.run_id, next_batch = batch_index + 1, "Import resumed");
        self.events
            .publish(RunResumed {
                run_id: self.run_id.clone(),
                timestamp: Utc::now(),
            })
            .await;
        true
    }

    async fn dispatch(&self, request: &BatchRequest) -> Result<BatchResult, ProcessorError> {
        self.metrics
            .record_dispatch(request.row_count as u64, request.payload.len() as u64);
        debug!(
            batch = request.number(),
            rows = request.row_count,
            bytes = request.payload.len(),
            "Dispatching batch"
        );

        let call = self.processor.process(request);
        match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ProcessorError::Timeout(limit))?,
            None => call.await,
        }
    }

    /// Waits between two batches. Returns `false` if a stop arrived meanwhile.
    async fn inter_batch_delay(&self) -> bool {
        if self.config.inter_batch_delay.is_zero() {
            return !self.control.is_stopped();
        }

        tokio::select! {
            _ = tokio::time::sleep(self.config.inter_batch_delay) => true,
            _ = self.control.stopped() => false,
        }
    }

    async fn batch_completed(&self, request: &BatchRequest, result: &BatchResult) {
        let processed_records = self.progress.snapshot().processed_records;
        info!(
            batch = request.number(),
            rows = request.row_count,
            inserted = result.inserted,
            skipped = result.skipped,
            errors = result.errors.len(),
            processed = processed_records,
            total = self.plan.total_records(),
            "Batch completed"
        );
        self.events
            .publish(BatchCompleted {
                run_id: self.run_id.clone(),
                batch: request.number(),
                rows: request.row_count,
                processed_records,
                inserted: result.inserted,
                skipped: result.skipped,
                errors: result.errors.len(),
                timestamp: Utc::now(),
            })
            .await;
    }

    async fn batch_failed(&self, request: &BatchRequest, error: String) {
        let processed_records = self.progress.snapshot().processed_records;
        warn!(
            batch = request.number(),
            rows = request.row_count,
            error = %error,
            "Batch failed, continuing with the next one"
        );
        self.events
            .publish(BatchFailed {
                run_id: self.run_id.clone(),
                batch: request.number(),
                rows: request.row_count,
                processed_records,
                error,
                timestamp: Utc::now(),
            })
            .await;
    }

    async fn announce_finish(&self, state: &ImportState) {
        let summary = state.summary();
        match state.status {
            ImportStatus::Completed => {
                info!(
                    run_id = %self.run_id,
                    inserted = summary.inserted,
                    skipped = summary.skipped,
                    counters = ?summary.counters,
                    errors = summary.error_count,
                    duration_ms = summary.duration_ms,
                    "Import completed"
                );
                self.events
                    .publish(RunCompleted {
                        summary,
                        timestamp: Utc::now(),
                    })
                    .await;
            }
            _ => {
                info!(
                    run_id = %self.run_id,
                    completed_batches = summary.completed_batches,
                    total_batches = summary.total_batches,
                    processed = summary.processed_records,
                    inserted = summary.inserted,
                    errors = summary.error_count,
                    "Import stopped"
                );
                self.events
                    .publish(RunStopped {
                        summary,
                        timestamp: Utc::now(),
                    })
                    .await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::{sync::Mutex, time::Duration};

    #[derive(Default)]
    struct RecordingProcessor {
        requests: Mutex<Vec<BatchRequest>>,
        fail_batch: Option<usize>,
        latency: Option<Duration>,
    }

    impl RecordingProcessor {
        fn seen(&self) -> Vec<BatchRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BatchProcessor for RecordingProcessor {
        fn name(&self) -> &str {
            "recording"
        }

        async fn process(&self, request: &BatchRequest) -> Result<BatchResult, ProcessorError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            if self.fail_batch == Some(request.batch_index) {
                return Err(ProcessorError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(BatchResult::new(request.row_count as u64, 0).with_counter("seen", 1))
        }
    }

    fn records(n: usize, header: Option<&str>) -> RawRecordSet {
        RawRecordSet::new(
            header.map(str::to_string),
            (1..=n).map(|i| format!("row{i}")).collect(),
        )
    }

    fn scheduler(
        processor: Arc<RecordingProcessor>,
        records: RawRecordSet,
        batch_size: usize,
    ) -> (BatchScheduler, ControlChannel, ProgressAggregator) {
        let plan = BatchPlan::new(records.len(), batch_size).unwrap();
        let control = ControlChannel::new();
        let progress = ProgressAggregator::new();
        let scheduler =
            BatchScheduler::new(RunId::from("run-test"), "acct-1", records, plan, processor)
                .with_control(control.clone())
                .with_progress(progress.clone())
                .with_config(SchedulerConfig::default().with_call_timeout(None));
        scheduler.begin();
        (scheduler, control, progress)
    }

    #[tokio::test(start_paused = true)]
    async fn dispatches_every_batch_in_order() {
        let processor = Arc::new(RecordingProcessor::default());
        let (scheduler, _, _) = scheduler(processor.clone(), records(250, None), 100);

        let state = scheduler.run().await;

        let seen = processor.seen();
        assert_eq!(seen.iter().map(|r| r.row_count).collect::<Vec<_>>(), vec![100, 100, 50]);
        assert_eq!(seen.iter().map(|r| r.batch_index).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(state.status, ImportStatus::Completed);
        assert_eq!(state.current_batch, 3);
        assert_eq!(state.processed_records, 250);
        assert_eq!(state.totals.inserted, 250);
        assert_eq!(state.totals.counter("seen"), 3);
        assert!(state.finished_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_batch_is_logged_and_skipped() {
        let processor = Arc::new(RecordingProcessor {
            fail_batch: Some(1),
            ..Default::default()
        });
        let (scheduler, _, _) = scheduler(processor.clone(), records(250, None), 100);

        let state = scheduler.run().await;

        assert_eq!(processor.seen().len(), 3);
        assert_eq!(state.status, ImportStatus::Completed);
        assert_eq!(state.totals.inserted, 150);
        assert_eq!(state.error_log, vec!["Batch 2: HTTP 500: boom"]);
        assert_eq!(state.processed_records, 250);
    }

    #[tokio::test(start_paused = true)]
    async fn header_is_prepended_to_every_batch() {
        let processor = Arc::new(RecordingProcessor::default());
        let (scheduler, _, _) = scheduler(processor.clone(), records(3, Some("email,points")), 2);

        scheduler.run().await;

        let seen = processor.seen();
        assert_eq!(seen[0].payload, "email,points\nrow1\nrow2");
        assert_eq!(seen[1].payload, "email,points\nrow3");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_call_becomes_timeout_failure() {
        let processor = Arc::new(RecordingProcessor {
            latency: Some(Duration::from_secs(5)),
            ..Default::default()
        });
        let (scheduler, _, _) = scheduler(processor.clone(), records(2, None), 1);
        let timeout = Some(Duration::from_millis(50));
        let scheduler =
            scheduler.with_config(SchedulerConfig::default().with_call_timeout(timeout));

        let state = scheduler.run().await;

        assert_eq!(state.status, ImportStatus::Completed);
        assert_eq!(state.totals.inserted, 0);
        assert_eq!(
            state.error_log,
            vec![
                "Batch 1: request timed out after 50ms",
                "Batch 2: request timed out after 50ms"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_start_dispatches_nothing() {
        let processor = Arc::new(RecordingProcessor::default());
        let (scheduler, control, _) = scheduler(processor.clone(), records(10, None), 5);
        control.stop();

        let state = scheduler.run().await;

        assert!(processor.seen().is_empty());
        assert_eq!(state.status, ImportStatus::Stopped);
        assert_eq!(state.current_batch, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_while_paused_leaves_progress_untouched() {
        let processor = Arc::new(RecordingProcessor::default());
        let (scheduler, control, progress) = scheduler(processor.clone(), records(10, None), 5);
        control.pause();

        let handle = tokio::spawn(scheduler.run());
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(progress.status(), ImportStatus::Paused);
        assert!(processor.seen().is_empty());

        control.stop();
        let state = handle.await.unwrap();

        assert!(processor.seen().is_empty());
        assert_eq!(state.status, ImportStatus::Stopped);
        assert_eq!(state.processed_records, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_continues_from_next_batch() {
        let processor = Arc::new(RecordingProcessor::default());
        let (scheduler, control, progress) = scheduler(processor.clone(), records(10, None), 5);
        control.pause();

        let handle = tokio::spawn(scheduler.run());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(progress.status(), ImportStatus::Paused);

        control.resume();
        let state = handle.await.unwrap();

        assert_eq!(processor.seen().len(), 2);
        assert_eq!(state.status, ImportStatus::Completed);
        assert_eq!(state.processed_records, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn finished_run_does_not_overwrite_its_successor() {
        let processor = Arc::new(RecordingProcessor::default());
        let (scheduler, control, progress) = scheduler(processor.clone(), records(4, None), 2);
        control.pause();

        let handle = tokio::spawn(scheduler.run());
        tokio::time::sleep(Duration::from_secs(1)).await;

        progress.begin(RunId::from("run-next"), 6, 3);
        control.stop();
        handle.await.unwrap();

        let state = progress.snapshot();
        assert_eq!(state.run_id, Some(RunId::from("run-next")));
        assert_eq!(state.status, ImportStatus::Running);
        assert!(state.finished_at.is_none());
        assert_eq!(state.total_batches, 3);
    }
}
