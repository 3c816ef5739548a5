use connectors::error::ProcessorError;
use engine_config::settings::error::SettingsError;
use engine_core::error::PlanError;
use engine_runtime::error::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required value '{flag}' (pass --{flag} or set {env})")]
    MissingValue {
        flag: &'static str,
        env: &'static str,
    },

    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("Invalid batch plan: {0}")]
    Plan(#[from] PlanError),

    #[error("Failed to set up the batch processor: {0}")]
    Processor(#[from] ProcessorError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),
}
