use crate::error::PlanError;
use serde::Serialize;
use std::ops::Range;

/// Default number of data lines per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Fixed-size chunking of a run's records. Computed once at run start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchPlan {
    batch_size: usize,
    total_records: usize,
    total_batches: usize,
}

impl BatchPlan {
    pub fn new(total_records: usize, batch_size: usize) -> Result<Self, PlanError> {
        if batch_size == 0 {
            return Err(PlanError::InvalidBatchSize);
        }

        Ok(BatchPlan {
            batch_size,
            total_records,
            total_batches: total_records.div_ceil(batch_size),
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn total_records(&self) -> usize {
        self.total_records
    }

    pub fn total_batches(&self) -> usize {
        self.total_batches
    }

    pub fn is_last(&self, batch_index: usize) -> bool {
        batch_index + 1 >= self.total_batches
    }

    /// Line range `[i*size, min((i+1)*size, total))` for batch `i`.
    pub fn range(&self, batch_index: usize) -> Range<usize> {
        let start = batch_index
            .saturating_mul(self.batch_size)
            .min(self.total_records);
        let end = start.saturating_add(self.batch_size).min(self.total_records);
        start..end
    }

    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.total_batches).map(|i| self.range(i))
    }
}
