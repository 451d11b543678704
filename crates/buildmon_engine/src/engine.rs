use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use monitor_logging::{monitor_error, monitor_info};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::{
    shutdown_signal, system_clock, ChannelSink, Downloader, FeedMonitor, FeedStore, FetchSettings,
    MonitorEvent, ReqwestFetcher, Scheduler,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Runs the scheduler on its own thread and exposes the sink events.
pub struct MonitorEngine {
    event_rx: mpsc::Receiver<MonitorEvent>,
    shutdown: CancellationToken,
    runtime: Handle,
    thread: Option<JoinHandle<()>>,
}

impl MonitorEngine {
    pub fn start(store: Arc<dyn FeedStore>, settings: FetchSettings) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (event_tx, event_rx) = mpsc::channel();

        let fetcher = Arc::new(ReqwestFetcher::new(settings));
        let downloader = Downloader::new(fetcher, runtime.handle().clone());
        let sink = Arc::new(ChannelSink::new(event_tx));
        let monitor = Arc::new(FeedMonitor::new(store, sink, downloader, system_clock()));

        let handle = runtime.handle().clone();
        let shutdown = CancellationToken::new();
        let scheduler = Scheduler::new(monitor, shutdown.clone());
        let thread = thread::Builder::new()
            .name("buildmon-scheduler".to_string())
            .spawn(move || {
                runtime.block_on(scheduler.run());
                // Abandon downloads still in flight.
                runtime.shutdown_background();
            })?;

        Ok(Self {
            event_rx,
            shutdown,
            runtime: handle,
            thread: Some(thread),
        })
    }

    pub fn try_recv(&self) -> Option<MonitorEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<MonitorEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Requests a stop when the process receives Ctrl+C or SIGTERM.
    pub fn stop_on_signal(&self) {
        let shutdown = self.shutdown.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                _ = shutdown_signal() => {
                    monitor_info!("stopping the monitor");
                    shutdown.cancel();
                }
                _ = shutdown.cancelled() => {}
            }
        });
    }

    /// Asks the scheduler to stop after the current cycle's dispatch.
    pub fn request_stop(&self) {
        self.shutdown.cancel();
    }

    pub fn is_stopping(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Stops the scheduler and waits for its thread to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shutdown.cancel();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                monitor_error!("scheduler thread panicked");
            }
        }
    }
}

impl Drop for MonitorEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
