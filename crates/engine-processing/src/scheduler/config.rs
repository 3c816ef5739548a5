use engine_config::settings::{
    DEFAULT_CALL_TIMEOUT, DEFAULT_INTER_BATCH_DELAY, DEFAULT_POLL_INTERVAL, ImportSettings,
};
use std::time::Duration;

/// Timing knobs of the batch loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// How long a paused run sleeps before re-checking its control flags
    pub poll_interval: Duration,

    /// Pause between two consecutive batch calls
    pub inter_batch_delay: Duration,

    /// Upper bound for one processor call; `None` waits for as long as it takes
    pub call_timeout: Option<Duration>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            inter_batch_delay: DEFAULT_INTER_BATCH_DELAY,
            call_timeout: Some(DEFAULT_CALL_TIMEOUT),
        }
    }
}

impl SchedulerConfig {
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
}

impl From<&ImportSettings> for SchedulerConfig {
    fn from(settings: &ImportSettings) -> Self {
        Self {
            poll_interval: settings.poll_interval,
            inter_batch_delay: settings.inter_batch_delay,
            call_timeout: settings.call_timeout,
        }
    }
}
