use crate::records::batch::BatchResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Running sums over every merged [`BatchResult`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportTotals {
    pub inserted: u64,
    pub skipped: u64,
    pub counters: BTreeMap<String, u64>,
}

impl ImportTotals {
    /// Element-wise add of a batch's counters. Errors are not counted here.
    pub fn merge(&mut self, result: &BatchResult) {
        self.inserted = self.inserted.saturating_add(result.inserted);
        self.skipped = self.skipped.saturating_add(result.skipped);
        for (name, value) in &result.counters {
            let total = self.counters.entry(name.clone()).or_default();
            *total = total.saturating_add(*value);
        }
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }
}
