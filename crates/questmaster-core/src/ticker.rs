//! Cancellable periodic timer.
//!
//! The engines never own a thread; a front end that wants a live countdown
//! or a periodic refresh starts a [`Ticker`] and calls the engine's `tick()`
//! for every message it receives. Stopping or dropping the handle aborts the
//! background task, so a closed quiz cannot leave a timer behind.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Number of ticks delivered so far, starting at 1.
pub type TickCount = u64;

pub struct Ticker {
    handle: Option<JoinHandle<()>>,
    rx: mpsc::Receiver<TickCount>,
}

impl Ticker {
    /// Start ticking every `period`. The first tick arrives after one period.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // tokio's first tick fires immediately.
            interval.tick().await;

            let mut count: TickCount = 0;
            loop {
                interval.tick().await;
                count += 1;
                if tx.send(count).await.is_err() {
                    tracing::debug!(count, "ticker receiver dropped");
                    break;
                }
            }
        });
        Self {
            handle: Some(handle),
            rx,
        }
    }

    /// Wait for the next tick. `None` once the ticker is stopped.
    pub async fn tick(&mut self) -> Option<TickCount> {
        if self.handle.is_none() {
            return None;
        }
        self.rx.recv().await
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Abort the background task. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            self.rx.close();
            tracing::debug!("ticker stopped");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
