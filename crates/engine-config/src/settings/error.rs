use thiserror::Error;

/// Errors raised while validating import settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// One or more settings are out of range.
    #[error("Invalid settings: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    /// A profile or header mode name was not recognised.
    #[error("Unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },
}
