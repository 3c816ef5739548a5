use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Batch size must be greater than zero")]
    InvalidBatchSize,
}
