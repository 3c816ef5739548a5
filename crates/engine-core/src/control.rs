use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Pause/stop signals for a single run.
///
/// Writers (`pause`, `resume`, `stop`) never block. The scheduler only reads
/// the flags at its checkpoints, so a stop never interrupts an in-flight
/// batch call. A new channel is created for every run; clones share state.
#[derive(Debug, Clone, Default)]
pub struct ControlChannel {
    paused: Arc<AtomicBool>,
    stop: CancellationToken,
}

impl ControlChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        if !self.paused.swap(true, Ordering::SeqCst) {
            info!("Pause requested");
        }
    }

    pub fn resume(&self) {
        if self.paused.swap(false, Ordering::SeqCst) {
            info!("Resume requested");
        }
    }

    /// Soft stop: batches not yet dispatched are skipped.
    pub fn stop(&self) {
        if !self.stop.is_cancelled() {
            info!("Stop requested");
        }
        self.stop.cancel();
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Resolves once `stop()` has been called.
    pub async fn stopped(&self) {
        self.stop.cancelled().await
    }
}
