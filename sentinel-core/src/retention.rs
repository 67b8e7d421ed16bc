use chrono::{Duration as ChronoDuration, Utc};
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::store::AlertStore;

/// Age beyond which alert records are purged.
pub const RETENTION_DAYS: i64 = 7;

/// Default cadence between sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Periodically deletes alert records older than the retention horizon.
/// A failed sweep is logged and swallowed; the next scheduled one proceeds
/// regardless. No retry, no backoff, no cumulative error state.
pub struct RetentionSweeper {
    store: AlertStore,
    period: Duration,
    retention: ChronoDuration,
}

impl RetentionSweeper {
    pub fn new(store: AlertStore) -> Self {
        Self {
            store,
            period: SWEEP_INTERVAL,
            retention: ChronoDuration::days(RETENTION_DAYS),
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// One pass: compute the cutoff fresh, purge, log the count.
    pub async fn sweep(&self) {
        info!("Running alert retention sweep");
        let cutoff = Utc::now() - self.retention;
        match self.store.purge_older_than(cutoff).await {
            Ok(deleted) => info!("Retention sweep completed, deleted {} expired alerts", deleted),
            Err(e) => error!("Retention sweep failed: {}", e),
        }
    }

    /// Sweep once at startup and then every period until cancellation.
    pub async fn run(self, shutdown: CancellationToken) {
        info!("Retention sweeper started");
        let mut ticker = interval(self.period);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Retention sweeper stopping");
                    break;
                }
                _ = ticker.tick() => self.sweep().await,
            }
        }
    }
}
