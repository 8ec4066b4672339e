//! Background token renewal.
//!
//! Checks the store's token once right away and then on a fixed interval.
//! The task ends when stopped, when its handle is dropped, or when the store
//! it watches is disposed.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::store::{AuthError, AuthStore, TokenCheckOutcome};

/// Interval between two token checks
pub const DEFAULT_RENEWAL_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub struct TokenRenewalTask {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TokenRenewalTask {
    /// Spawn the renewal loop on the current tokio runtime
    pub fn spawn(store: Arc<AuthStore>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("Token renewal started (every {}s)", interval.as_secs());

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        info!("Token renewal stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        match store.check_token(Utc::now()) {
                            Ok(TokenCheckOutcome::NoToken) => debug!("Token check: no token"),
                            Ok(outcome) => info!("Token check: {}", outcome),
                            Err(AuthError::Disposed) => {
                                info!("Auth store disposed, token renewal exiting");
                                break;
                            }
                            Err(e) => warn!("Token check failed: {}", e),
                        }
                    }
                }
            }
        });

        Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |handle| handle.is_finished())
    }

    /// Signal the loop to stop and wait for it to exit
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Token renewal task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for TokenRenewalTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
