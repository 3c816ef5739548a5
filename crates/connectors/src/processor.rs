use crate::error::ProcessorError;
use async_trait::async_trait;
use model::records::batch::{BatchRequest, BatchResult};

/// The remote endpoint that validates and inserts a batch of rows.
///
/// Implementations must be safe to call again with the same batch when an
/// operator re-imports residual rows; the scheduler never retries on its own.
#[async_trait]
pub trait BatchProcessor: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Sends one batch and returns the endpoint's counters.
    async fn process(&self, request: &BatchRequest) -> Result<BatchResult, ProcessorError>;
}
