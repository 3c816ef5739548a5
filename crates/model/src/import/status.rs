use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of an import run.
///
/// `Idle -> Running -> {Paused <-> Running} -> {Completed | Stopped}`.
/// Terminal states are only left through a fresh `start()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImportStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
    Stopped,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Idle => "Idle",
            ImportStatus::Running => "Running",
            ImportStatus::Paused => "Paused",
            ImportStatus::Completed => "Completed",
            ImportStatus::Stopped => "Stopped",
        }
    }

    /// A run in this state owns the importer; a new `start()` is rejected.
    pub fn is_active(&self) -> bool {
        matches!(self, ImportStatus::Running | ImportStatus::Paused)
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
