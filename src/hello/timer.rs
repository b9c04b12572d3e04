//! Periodic timer
//!
//! Runs a callback on a tokio task every `period` until stopped. The first
//! tick fires one period after `start`; a tick that runs late pushes the
//! following ones back instead of bursting to catch up.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

use crate::utils::{Error, Result};

#[derive(Debug)]
pub struct PeriodicTimer {
    period: Duration,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTimer {
    /// Arms the timer. Must be called from within a tokio runtime.
    ///
    /// A zero period is refused.
    pub fn start<F>(period: Duration, mut on_tick: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        if period.is_zero() {
            return Err(Error::InvalidState("timer period must be non-zero".to_string()));
        }
        let (shutdown, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    // fires on stop() and when the timer is dropped
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => on_tick(),
                }
            }
            debug!("Periodic timer stopped");
        });

        Ok(Self {
            period,
            shutdown: Some(shutdown),
            handle: Some(handle),
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Disarms the timer and waits for a tick in flight to finish. No tick
    /// fires after this returns.
    pub async fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Periodic timer task ended abnormally: {e}");
            }
        }
    }
}
