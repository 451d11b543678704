use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use buildmon_core::{Feed, FeedId, FeedKind};
use monitor_logging::{monitor_debug, monitor_info};

use crate::{
    Clock, Downloader, DownloaderCallback, FeedParser, FeedStore, MonitorSettings, StoreError,
    UiSink,
};

/// Owns the live feed set and fans out one poll cycle's downloads.
pub struct FeedMonitor {
    store: Arc<dyn FeedStore>,
    sink: Arc<dyn UiSink>,
    downloader: Downloader,
    clock: Clock,
    feeds: Mutex<Vec<Feed>>,
}

impl FeedMonitor {
    pub fn new(
        store: Arc<dyn FeedStore>,
        sink: Arc<dyn UiSink>,
        downloader: Downloader,
        clock: Clock,
    ) -> Self {
        Self {
            store,
            sink,
            downloader,
            clock,
            feeds: Mutex::new(Vec::new()),
        }
    }

    pub fn settings(&self) -> MonitorSettings {
        self.store.settings()
    }

    pub fn downloader(&self) -> &Downloader {
        &self.downloader
    }

    /// Snapshot of the feed set as of the last cycle.
    pub fn feeds(&self) -> Vec<Feed> {
        self.lock_feeds().clone()
    }

    /// Reloads the feed set, rebuilds the sink's panels and issues the
    /// downloads of every feed that is not ignored. Returns once all
    /// downloads are issued; their completion is not awaited.
    pub fn run_all(&self) -> usize {
        let settings = self.store.settings();
        // Held until the sink has the new feed set, so a concurrent removal
        // lands either before the reload or after the prepare.
        let feeds = {
            let mut live = self.lock_feeds();
            let feeds = self.refresh_feeds(&mut live, &settings);
            self.sink.prepare(&feeds);
            feeds
        };

        let executor = self.callback(FeedKind::Executor, &settings);
        let historic = self.callback(FeedKind::Historic, &settings);

        let mut issued = 0;
        for feed in feeds.iter().filter(|feed| !feed.is_ignored()) {
            issued += self.run(feed, &settings, &executor, &historic);
        }
        monitor_info!(
            "[cycle {}] issued {} downloads for {} feeds",
            monitor_logging::poll_cycle(),
            issued,
            feeds.len()
        );
        issued
    }

    fn run(
        &self,
        feed: &Feed,
        settings: &MonitorSettings,
        executor: &Arc<DownloaderCallback>,
        historic: &Arc<DownloaderCallback>,
    ) -> usize {
        let credentials = settings.credentials();
        let mut issued = 0;
        if settings.executor_enabled {
            let url = feed.executor(&settings.executor_url).url();
            monitor_debug!("executor download for feed {} from {}", feed.id(), url);
            self.downloader
                .download(executor.clone(), url, feed, credentials.clone());
            issued += 1;
        }
        monitor_debug!("historic download for feed {} from {}", feed.id(), feed.url());
        self.downloader
            .download(historic.clone(), feed.url(), feed, credentials);
        issued + 1
    }

    fn callback(&self, kind: FeedKind, settings: &MonitorSettings) -> Arc<DownloaderCallback> {
        let parser = FeedParser::for_kind(
            kind,
            settings.feed_size,
            settings.status_mode,
            self.clock.clone(),
        );
        Arc::new(DownloaderCallback::new(kind, parser, self.sink.clone()))
    }

    /// Merges the stored feed list into the live set. Feeds keep their
    /// identity across reloads so executor handles stay cached. Feeds gone
    /// from configuration lose their panel.
    fn refresh_feeds(&self, live: &mut Vec<Feed>, settings: &MonitorSettings) -> Vec<Feed> {
        let stored = self.store.feeds();
        let mut previous = std::mem::take(live);
        for stored_feed in stored {
            let feed = match previous.iter().position(|feed| feed.id() == stored_feed.id()) {
                Some(index) => {
                    let mut feed = previous.swap_remove(index);
                    feed.rename(stored_feed.name());
                    feed.set_url(stored_feed.url());
                    feed
                }
                None => stored_feed,
            };
            if settings.executor_enabled {
                feed.executor(&settings.executor_url);
            }
            live.push(feed);
        }
        for dropped in previous {
            monitor_info!("feed {} left the configuration", dropped.id());
            self.sink.remove_panel(dropped.id());
        }
        live.clone()
    }

    pub fn add_feed(&self, name: &str, url: &str) -> Result<Feed, StoreError> {
        let feed = self.store.add_feed(name, url)?;
        monitor_info!("added feed {} ({})", feed.id(), feed.url());
        Ok(feed)
    }

    pub fn update_feed(&self, id: FeedId, name: &str, url: &str) -> Result<bool, StoreError> {
        let mut live = self.lock_feeds();
        let updated = self.store.update_feed(id, name, url)?;
        if updated {
            if let Some(feed) = live.iter_mut().find(|feed| feed.id() == id) {
                feed.rename(name);
                feed.set_url(url);
            }
        }
        Ok(updated)
    }

    /// Removes the feed from configuration and drops its panel. A download
    /// still in flight is left to complete; the sink ignores its result.
    pub fn remove_feed(&self, id: FeedId) -> Result<bool, StoreError> {
        let mut live = self.lock_feeds();
        let removed = self.store.remove_feed(id)?;
        live.retain(|feed| feed.id() != id);
        self.sink.remove_panel(id);
        if removed {
            monitor_info!("removed feed {}", id);
        }
        Ok(removed)
    }

    fn lock_feeds(&self) -> MutexGuard<'_, Vec<Feed>> {
        self.feeds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
