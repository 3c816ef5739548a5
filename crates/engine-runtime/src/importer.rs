use crate::error::ImportError;
use connectors::processor::BatchProcessor;
use engine_config::settings::{ImportSettings, validator::SettingsValidator};
use engine_core::{
    control::ControlChannel,
    event_bus::bus::EventBus,
    input::{header::HeaderDetector, normalizer::normalize},
    metrics::{Metrics, MetricsSnapshot},
    plan::batch::BatchPlan,
    progress::ProgressAggregator,
};
use engine_processing::scheduler::{BatchScheduler, SchedulerConfig};
use model::{core::identifiers::RunId, import::state::ImportState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{Instrument, debug, info, info_span};

struct ActiveRun {
    run_id: RunId,
    control: ControlChannel,
    metrics: Metrics,
    handle: Option<JoinHandle<ImportState>>,
}

/// Caller-facing control surface of one importer instance.
///
/// An importer runs at most one import at a time. Every `start()` gets a
/// fresh control channel and metrics; progress and events are shared across
/// runs so observers can stay subscribed.
pub struct Importer {
    target: String,
    processor: Arc<dyn BatchProcessor>,
    settings: ImportSettings,
    detector: Arc<dyn HeaderDetector>,
    progress: ProgressAggregator,
    events: EventBus,
    active: Mutex<Option<ActiveRun>>,
}

impl Importer {
    pub fn new(
        target: impl Into<String>,
        processor: Arc<dyn BatchProcessor>,
        settings: ImportSettings,
    ) -> Result<Self, ImportError> {
        SettingsValidator::validate(&settings)?;
        let detector = settings.header_detector();

        Ok(Importer {
            target: target.into(),
            processor,
            settings,
            detector,
            progress: ProgressAggregator::new(),
            events: EventBus::new(),
            active: Mutex::new(None),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Normalizes `raw_text`, plans the batches and spawns the scheduler on
    /// the current Tokio runtime. Nothing is dispatched when an error is
    /// returned.
    pub fn start(&self, raw_text: &str, batch_size: usize) -> Result<RunId, ImportError> {
        let mut active = self.lock_active();

        let current = self.progress.snapshot();
        if current.status.is_active() {
            return Err(ImportError::AlreadyRunning {
                run_id: current
                    .run_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
            });
        }

        if self.target.trim().is_empty() {
            return Err(ImportError::MissingTarget);
        }

        let records = normalize(raw_text, self.detector.as_ref());
        if records.is_empty() {
            return Err(ImportError::EmptyInput);
        }
        let plan = BatchPlan::new(records.len(), batch_size)?;

        let run_id = RunId::generate();
        let control = ControlChannel::new();
        let metrics = Metrics::new();

        info!(
            run_id = %run_id,
            target = %self.target,
            records = plan.total_records(),
            batches = plan.total_batches(),
            "Starting import"
        );

        let scheduler = BatchScheduler::new(
            run_id.clone(),
            self.target.clone(),
            records,
            plan,
            self.processor.clone(),
        )
        .with_control(control.clone())
        .with_progress(self.progress.clone())
        .with_events(self.events.clone())
        .with_metrics(metrics.clone())
        .with_config(SchedulerConfig::from(&self.settings));

        scheduler.begin();
        let span = info_span!("import", run_id = %run_id);
        let handle = tokio::spawn(scheduler.run().instrument(span));

        *active = Some(ActiveRun {
            run_id: run_id.clone(),
            control,
            metrics,
            handle: Some(handle),
        });

        Ok(run_id)
    }

    /// Requests a pause; takes effect before the next batch is dispatched.
    pub fn pause(&self) {
        self.with_live_run("pause", |run| run.control.pause());
    }

    pub fn resume(&self) {
        self.with_live_run("resume", |run| run.control.resume());
    }

    /// Requests a stop. An in-flight batch call still completes and is merged.
    pub fn stop(&self) {
        self.with_live_run("stop", |run| run.control.stop());
    }

    pub fn snapshot(&self) -> ImportState {
        self.progress.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ImportState> {
        self.progress.subscribe()
    }

    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    /// The most recent errors, bounded by the configured tail length.
    pub fn error_tail(&self) -> Vec<String> {
        self.progress.error_tail(self.settings.error_tail)
    }

    /// Traffic counters of the current (or last) run.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.lock_active()
            .as_ref()
            .map(|run| run.metrics.snapshot())
            .unwrap_or_default()
    }

    /// Waits for the current run to finish and returns its final state. If
    /// the run was already awaited, or none was started, the latest snapshot
    /// is returned.
    pub async fn wait(&self) -> Result<ImportState, ImportError> {
        let handle = self
            .lock_active()
            .as_mut()
            .and_then(|run| run.handle.take());

        match handle {
            Some(handle) => Ok(handle.await?),
            None => Ok(self.snapshot()),
        }
    }

    fn with_live_run(&self, action: &str, f: impl FnOnce(&ActiveRun)) {
        let active = self.lock_active();
        match active.as_ref() {
            Some(run) if self.progress.status().is_active() => {
                debug!(run_id = %run.run_id, action, "Control request");
                f(run);
            }
            _ => debug!(action, "No active import, ignoring control request"),
        }
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveRun>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use connectors::error::ProcessorError;
    use engine_core::error::PlanError;
    use model::{
        import::status::ImportStatus,
        records::batch::{BatchRequest, BatchResult},
    };
    use std::time::Duration;

    struct CountingProcessor;

    #[async_trait]
    impl BatchProcessor for CountingProcessor {
        fn name(&self) -> &str {
            "counting"
        }

        async fn process(&self, request: &BatchRequest) -> Result<BatchResult, ProcessorError> {
            Ok(BatchResult::new(request.row_count as u64, 0))
        }
    }

    fn importer(target: &str) -> Importer {
        let settings = ImportSettings::default().with_inter_batch_delay(Duration::from_millis(10));
        Importer::new(target, Arc::new(CountingProcessor), settings).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_empty_input() {
        let importer = importer("acct");
        let err = importer.start("\n   \n\r\n", 10).unwrap_err();
        assert!(matches!(err, ImportError::EmptyInput));
        assert_eq!(importer.snapshot().status, ImportStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn header_only_input_is_empty() {
        let importer = importer("acct");
        let err = importer.start("email,points\n", 10).unwrap_err();
        assert!(matches!(err, ImportError::EmptyInput));
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_zero_batch_size() {
        let importer = importer("acct");
        let err = importer.start("a\nb", 0).unwrap_err();
        assert!(matches!(err, ImportError::Plan(PlanError::InvalidBatchSize)));
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_missing_target() {
        let importer = importer("  ");
        let err = importer.start("a\nb", 1).unwrap_err();
        assert!(matches!(err, ImportError::MissingTarget));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = ImportSettings::default().with_batch_size(0);
        let result = Importer::new("acct", Arc::new(CountingProcessor), settings);
        assert!(matches!(result, Err(ImportError::Settings(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_rejected_while_active() {
        let importer = importer("acct");
        let first = importer.start("a\nb\nc", 1).unwrap();
        importer.pause();

        let err = importer.start("x", 1).unwrap_err();
        match err {
            ImportError::AlreadyRunning { run_id } => assert_eq!(run_id, first.to_string()),
            other => panic!("unexpected error: {other}"),
        }

        importer.stop();
        let state = importer.wait().await.unwrap();
        assert_eq!(state.status, ImportStatus::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_returns_final_state() {
        let importer = importer("acct");
        importer.start("a\nb\nc", 2).unwrap();

        let state = importer.wait().await.unwrap();
        assert_eq!(state.status, ImportStatus::Completed);
        assert_eq!(state.totals.inserted, 3);
        assert_eq!(importer.metrics().batches_succeeded, 2);
        assert_eq!(importer.wait().await.unwrap(), state);
    }
}
