//! Background expiry sweep.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::CacheInner;

/// Owner of a running sweep task.
///
/// The task is aborted when the handle is stopped or dropped. It also ends on
/// its own once the cache it sweeps has been dropped.
#[derive(Debug)]
pub struct SweeperHandle {
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop sweeping.
    pub fn stop(self) {
        // Drop aborts the task
    }

    /// Whether the sweep task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Shortest sweep period. Tokio intervals reject a zero period.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Spawn a task sweeping `cache` every `period`, first sweep one period from now.
///
/// Periods below [`MIN_SWEEP_INTERVAL`] are raised to it.
pub(super) fn spawn(cache: Weak<CacheInner>, period: Duration) -> SweeperHandle {
    if period < MIN_SWEEP_INTERVAL {
        warn!(
            requested = ?period,
            "Sweep interval too short, using the minimum"
        );
    }
    let period = period.max(MIN_SWEEP_INTERVAL);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(inner) = cache.upgrade() else {
                debug!("Product cache dropped, stopping sweeper");
                break;
            };
            inner.sweep_expired();
        }
    });

    SweeperHandle { task }
}
