//! Periodic tick driver.
//!
//! Fires [`FeedController::tick`] at a fixed period on the Tokio runtime.
//! The first tick happens one full period after spawn. A failed tick is
//! logged and skipped; the loop keeps running until its task is aborted.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::controller::FeedController;

/// Shortest period the ticker will run at.
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

/// Spawn the tick loop as a background task.
///
/// Abort the returned handle to stop ticking.
pub fn spawn_ticker(controller: Arc<FeedController>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(run_ticker(controller, period))
}

/// Run the tick loop forever.
pub async fn run_ticker(controller: Arc<FeedController>, period: Duration) {
    let period = period.max(MIN_TICK_PERIOD);
    let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(period_ms = period.as_millis(), "Ticker started");

    loop {
        interval.tick().await;
        match controller.tick() {
            Ok(outcome) => debug!(
                tick = outcome.tick,
                order = %outcome.order_id,
                receivers = outcome.receivers,
                "Tick complete"
            ),
            Err(e) => warn!(error = %e, "Tick skipped"),
        }
    }
}
