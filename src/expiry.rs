//! Optional active expiration.
//!
//! Reads already evict expired keys lazily; the sweeper only reclaims keys
//! that are never read again. It runs under the same write lock as any other
//! mutation.

use std::{sync::Arc, time::Duration};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::key_value_store::KeySpace;

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to the background sweeper task. Dropping it stops the task.
#[derive(Debug)]
pub struct ExpirySweeper {
    shutdown_tx: watch::Sender<bool>,
}

impl ExpirySweeper {
    pub fn start(store: Arc<KeySpace>, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(sweeper_loop(store, interval, shutdown_rx));
        info!(interval_ms = interval.as_millis() as u64, "expiry sweeper started");

        Self { shutdown_tx }
    }

    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn sweeper_loop(
    store: Arc<KeySpace>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("expiry sweeper stopped");
                    return;
                }
            }
        }

        let removed = store.remove_expired_keys().await;

        if removed > 0 {
            debug!(removed, "removed expired keys");
        }
    }
}
