//! Background expiry for idle sessions
//!
//! The tracker only checks its deadline when called. A long-lived host that
//! may sit idle spawns an [`ExpiryWatcher`] so the session still ends on time.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::tracker::SessionTracker;

/// Tracker shared between the game loop and the watcher
pub type SharedTracker = Arc<Mutex<SessionTracker>>;

/// Periodically fires the tracker's inactivity timer. Stops on drop.
#[derive(Debug)]
pub struct ExpiryWatcher {
    handle: JoinHandle<()>,
}

impl ExpiryWatcher {
    /// Spawn on the current tokio runtime, polling every `poll_every`
    pub fn spawn(tracker: SharedTracker, poll_every: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let expired = tracker.lock().poll_timeout();
                if expired {
                    debug!("expiry watcher ended an idle session");
                }
            }
        });
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(self) {
        // Drop aborts the task.
    }
}

impl Drop for ExpiryWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
