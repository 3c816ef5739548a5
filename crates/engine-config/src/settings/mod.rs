use engine_core::{input::header::HeaderDetector, plan::batch::DEFAULT_BATCH_SIZE};
use profile::{HeaderMode, ImportProfile, header_detector};
use serde::Serialize;
use std::{sync::Arc, time::Duration};

pub mod error;
pub mod profile;
pub mod validator;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_INTER_BATCH_DELAY: Duration = Duration::from_millis(300);
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_ERROR_TAIL: usize = 10;

/// Tunables for an importer instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSettings {
    /// Data lines per batch (header excluded).
    pub batch_size: usize,
    /// How often a paused run re-checks its control flags.
    pub poll_interval: Duration,
    /// Courtesy delay between two batch calls.
    pub inter_batch_delay: Duration,
    /// Upper bound for a single batch call; `None` waits indefinitely.
    pub call_timeout: Option<Duration>,
    /// How many of the most recent errors a progress view shows.
    pub error_tail: usize,
    pub profile: ImportProfile,
    pub header_mode: HeaderMode,
    /// Replaces the profile's header markers when non-empty.
    pub header_markers: Vec<String>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        ImportSettings {
            batch_size: DEFAULT_BATCH_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            inter_batch_delay: DEFAULT_INTER_BATCH_DELAY,
            call_timeout: Some(DEFAULT_CALL_TIMEOUT),
            error_tail: DEFAULT_ERROR_TAIL,
            profile: ImportProfile::default(),
            header_mode: HeaderMode::default(),
            header_markers: Vec::new(),
        }
    }
}

impl ImportSettings {
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_inter_batch_delay(mut self, delay: Duration) -> Self {
        self.inter_batch_delay = delay;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_profile(mut self, profile: ImportProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_header_mode(mut self, mode: HeaderMode) -> Self {
        self.header_mode = mode;
        self
    }

    pub fn with_header_markers(mut self, markers: Vec<String>) -> Self {
        self.header_markers = markers;
        self
    }

    pub fn header_detector(&self) -> Arc<dyn HeaderDetector> {
        header_detector(self.header_mode, self.profile, &self.header_markers)
    }
}
