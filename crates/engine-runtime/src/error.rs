use engine_config::settings::error::SettingsError;
use engine_core::error::PlanError;
use thiserror::Error;

/// Pre-flight errors returned by the importer. Once a run has started,
/// per-batch failures are recorded in its error log instead.
#[derive(Debug, Error)]
pub enum ImportError {
    /// `start()` was called while a run is Running or Paused.
    #[error("An import is already in progress ({run_id})")]
    AlreadyRunning { run_id: String },

    #[error("No import target configured")]
    MissingTarget,

    /// The input had no data lines once blanks and the header were removed.
    #[error("Input contains no data rows")]
    EmptyInput,

    #[error("Invalid batch plan: {0}")]
    Plan(#[from] PlanError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// The scheduler task panicked or was aborted.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
