use std::sync::Arc;

use buildmon_core::{Feed, FeedKind};
use monitor_logging::monitor_debug;

use crate::{FeedParser, UiSink};

/// Binds the downloads of one feed kind to its parser and the UI sink.
pub struct DownloaderCallback {
    kind: FeedKind,
    parser: FeedParser,
    sink: Arc<dyn UiSink>,
}

impl DownloaderCallback {
    pub fn new(kind: FeedKind, parser: FeedParser, sink: Arc<dyn UiSink>) -> Self {
        Self { kind, parser, sink }
    }

    pub fn kind(&self) -> FeedKind {
        self.kind
    }

    /// Called synchronously before the fetch is issued.
    pub fn downloading(&self, feed: &Feed) {
        self.sink.set_status_downloading(self.kind, feed);
    }

    /// Called once with the fetched document, or the error body of a failed fetch.
    pub fn process(&self, document: &str, feed: &Feed) {
        let result = self.parser.parse(document);
        monitor_debug!(
            "[cycle {}] {} feed {} processed: {} builds, status {}",
            monitor_logging::poll_cycle(),
            self.kind,
            feed.id(),
            result.builds.len(),
            result.status
        );
        self.sink.set_status_processed(self.kind, feed, result);
    }
}
