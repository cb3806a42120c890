//! Background culling of expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::ExpiringCache;

/// Handle to the periodic cull task. Start once at startup, stop at shutdown.
pub struct CullTimer {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl CullTimer {
    /// Spawn a task that culls `cache` every `interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(cache: ExpiringCache, interval: Duration) -> Self {
        let token = CancellationToken::new();
        let handle = tokio::spawn(cull_loop(cache, interval, token.clone()));
        tracing::info!(interval_secs = interval.as_secs(), "Cache cull timer started");
        Self { token, handle }
    }

    /// Cancel the task and wait for it to exit.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!("Cache cull task ended abnormally: {e}");
        }
    }
}

async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => true,
        _ = sleep(duration) => false,
    }
}

async fn cull_loop(cache: ExpiringCache, interval: Duration, token: CancellationToken) {
    loop {
        if sleep_or_cancel(&token, interval).await {
            tracing::info!("Cache cull timer stopped (shutdown)");
            return;
        }
        cache.cull();
    }
}
