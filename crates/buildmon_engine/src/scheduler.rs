use std::sync::Arc;

use monitor_logging::monitor_info;
use tokio_util::sync::CancellationToken;

use crate::FeedMonitor;

/// Self-rescheduling poll loop.
///
/// Each cycle dispatches every download, then sleeps for the configured
/// interval, so consecutive dispatches never overlap. The loop only ends when
/// the shutdown token is cancelled.
pub struct Scheduler {
    monitor: Arc<FeedMonitor>,
    shutdown: CancellationToken,
}

impl Scheduler {
    pub fn new(monitor: Arc<FeedMonitor>, shutdown: CancellationToken) -> Self {
        Self { monitor, shutdown }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs cycles until shutdown. Returns the number of cycles dispatched.
    pub async fn run(&self) -> u64 {
        let mut cycle = 0;
        while !self.shutdown.is_cancelled() {
            cycle += 1;
            monitor_logging::set_poll_cycle(cycle);
            self.monitor.run_all();

            // Re-read each time so interval changes apply from the next cycle.
            let delay = self.monitor.settings().interval();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown.cancelled() => break,
            }
        }
        monitor_info!("scheduler stopped after {} cycles", cycle);
        cycle
    }
}
