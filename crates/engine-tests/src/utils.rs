#![allow(dead_code)]

use async_trait::async_trait;
use connectors::{error::ProcessorError, processor::BatchProcessor};
use engine_config::settings::ImportSettings;
use engine_runtime::Importer;
use model::records::batch::{BatchRequest, BatchResult};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::Notify;

/// Target used by every scenario.
pub const TARGET: &str = "acct-42";

/// In-memory processor whose answers are scripted per zero-based batch index.
///
/// Unscripted batches succeed with `inserted = row_count`.
#[derive(Default)]
pub struct ScriptedProcessor {
    requests: Mutex<Vec<BatchRequest>>,
    results: HashMap<usize, BatchResult>,
    failures: HashMap<usize, (u16, String)>,
    latency: HashMap<usize, Duration>,
    held: Option<usize>,
    entered: Notify,
    release: Notify,
}

impl ScriptedProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, batch_index: usize, result: BatchResult) -> Self {
        self.results.insert(batch_index, result);
        self
    }

    /// Makes the batch fail with a non-success HTTP status.
    pub fn fail(mut self, batch_index: usize, status: u16, body: &str) -> Self {
        self.failures.insert(batch_index, (status, body.to_string()));
        self
    }

    pub fn delay(mut self, batch_index: usize, latency: Duration) -> Self {
        self.latency.insert(batch_index, latency);
        self
    }

    /// Blocks the call for `batch_index` until [`ScriptedProcessor::release`].
    pub fn hold(mut self, batch_index: usize) -> Self {
        self.held = Some(batch_index);
        self
    }

    /// Resolves once the held batch call is in flight.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn requests(&self) -> Vec<BatchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn dispatched(&self) -> Vec<usize> {
        self.requests().iter().map(|r| r.batch_index).collect()
    }
}

#[async_trait]
impl BatchProcessor for ScriptedProcessor {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn process(&self, request: &BatchRequest) -> Result<BatchResult, ProcessorError> {
        self.requests.lock().unwrap().push(request.clone());

        if self.held == Some(request.batch_index) {
            self.entered.notify_one();
            self.release.notified().await;
        }

        if let Some(latency) = self.latency.get(&request.batch_index) {
            tokio::time::sleep(*latency).await;
        }

        if let Some((status, body)) = self.failures.get(&request.batch_index) {
            return Err(ProcessorError::Status {
                status: *status,
                body: body.clone(),
            });
        }

        Ok(self
            .results
            .get(&request.batch_index)
            .cloned()
            .unwrap_or_else(|| BatchResult::new(request.row_count as u64, 0)))
    }
}

/// `n` data lines with no header-looking content.
pub fn lines(n: usize) -> String {
    (1..=n)
        .map(|i| format!("row-{i},{}", i * 10))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn importer(processor: Arc<ScriptedProcessor>) -> Importer {
    importer_with(processor, ImportSettings::default())
}

pub fn importer_with(processor: Arc<ScriptedProcessor>, settings: ImportSettings) -> Importer {
    Importer::new(TARGET, processor, settings).unwrap()
}
