use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Turns SIGINT/SIGTERM into a soft stop request.
///
/// The token is cancelled on the first signal; the caller decides how to wind
/// the import down. A second signal is not handled specially.
#[derive(Clone, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    signalled: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_handlers(&self) {
        let token = self.token.clone();
        let signalled = self.signalled.clone();

        tokio::spawn(async move {
            let ctrl_c = async {
                signal::ctrl_c()
                    .await
                    .expect("Failed to install SIGINT handler");
            };

            #[cfg(unix)]
            let terminate = async {
                signal::unix::signal(signal::unix::SignalKind::terminate())
                    .expect("Failed to install SIGTERM handler")
                    .recv()
                    .await;
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => info!("Received SIGINT (Ctrl+C), stopping after the current batch"),
                _ = terminate => info!("Received SIGTERM, stopping after the current batch"),
            }

            signalled.store(true, Ordering::SeqCst);
            token.cancel();
        });
    }

    pub fn is_signalled(&self) -> bool {
        self.signalled.load(Ordering::SeqCst)
    }

    pub async fn signalled(&self) {
        self.token.cancelled().await;
    }
}

/// Exit status of a run that was wound down by SIGINT/SIGTERM.
pub const EXIT_INTERRUPTED: i32 = 130;
