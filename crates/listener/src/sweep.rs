//! Background removal of expired rate-limit counters.

use std::sync::Arc;
use std::time::Duration;

use intake::FixedWindowLimiter;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

/// Spawns a task that calls [`FixedWindowLimiter::evict_expired`] every
/// `every`. The first sweep happens one full interval after spawning.
///
/// The task runs until aborted.
pub fn spawn_sweeper(limiter: Arc<FixedWindowLimiter>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let evicted = limiter.evict_expired();
            if evicted > 0 {
                info!(evicted, tracked = limiter.tracked_clients(), "Rate-limit sweep");
            }
        }
    })
}
