use std::sync::mpsc;

use buildmon_core::{Feed, FeedId, FeedKind, FeedResult};

use crate::MonitorEvent;

/// Presentation side of the pipeline.
///
/// Calls for different feeds may arrive concurrently from download tasks;
/// implementations must keep their state keyed by feed id.
pub trait UiSink: Send + Sync {
    fn prepare(&self, feeds: &[Feed]);
    fn set_status_downloading(&self, kind: FeedKind, feed: &Feed);
    fn set_status_processed(&self, kind: FeedKind, feed: &Feed, result: FeedResult);
    fn remove_panel(&self, feed_id: FeedId);
}

/// Forwards every sink call as a `MonitorEvent` over a channel.
pub struct ChannelSink {
    tx: mpsc::Sender<MonitorEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<MonitorEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: MonitorEvent) {
        // The receiver going away means the app is shutting down.
        let _ = self.tx.send(event);
    }
}

impl UiSink for ChannelSink {
    fn prepare(&self, feeds: &[Feed]) {
        self.send(MonitorEvent::Prepared(feeds.to_vec()));
    }

    fn set_status_downloading(&self, kind: FeedKind, feed: &Feed) {
        self.send(MonitorEvent::Downloading {
            kind,
            feed_id: feed.id(),
        });
    }

    fn set_status_processed(&self, kind: FeedKind, feed: &Feed, result: FeedResult) {
        self.send(MonitorEvent::Processed {
            kind,
            feed_id: feed.id(),
            result,
        });
    }

    fn remove_panel(&self, feed_id: FeedId) {
        self.send(MonitorEvent::PanelRemoved { feed_id });
    }
}
