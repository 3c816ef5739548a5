use crate::import::status::ImportStatus;
use serde::Serialize;
use std::collections::BTreeMap;

/// Final report for a run, emitted exactly once when the scheduler exits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub run_id: String,
    pub status: ImportStatus,
    pub total_records: usize,
    pub processed_records: usize,
    pub total_batches: usize,
    pub completed_batches: usize,
    pub inserted: u64,
    pub skipped: u64,
    pub counters: BTreeMap<String, u64>,
    pub error_count: usize,
    pub duration_ms: Option<u64>,
}
