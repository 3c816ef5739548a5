use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    records_dispatched: AtomicU64,
    bytes_sent: AtomicU64,
    batches_succeeded: AtomicU64,
    batches_failed: AtomicU64,
}

/// Cheap counters describing the traffic a run sent to the processor.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records_dispatched: u64,
    pub bytes_sent: u64,
    pub batches_succeeded: u64,
    pub batches_failed: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatch(&self, records: u64, bytes: u64) {
        self.inner
            .records_dispatched
            .fetch_add(records, Ordering::Relaxed);
        self.inner.bytes_sent.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn increment_succeeded(&self) {
        self.inner.batches_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.inner.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_dispatched: self.inner.records_dispatched.load(Ordering::Relaxed),
            bytes_sent: self.inner.bytes_sent.load(Ordering::Relaxed),
            batches_succeeded: self.inner.batches_succeeded.load(Ordering::Relaxed),
            batches_failed: self.inner.batches_failed.load(Ordering::Relaxed),
        }
    }
}
