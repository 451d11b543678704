use std::collections::BTreeMap;

use crate::view_model::{BoardView, KindView, PanelView};
use crate::{AggregateStatus, Feed, FeedId, FeedKind, FeedResult, NotifyPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct KindPanel {
    downloading: bool,
    result: Option<FeedResult>,
}

impl KindPanel {
    fn view(&self) -> KindView {
        KindView {
            downloading: self.downloading,
            status: self.result.as_ref().map(|r| r.status.to_string()),
            title: self.result.as_ref().map(|r| r.title.clone()),
            build_count: self.result.as_ref().map_or(0, |r| r.builds.len()),
            newest: self
                .result
                .as_ref()
                .and_then(FeedResult::newest)
                .map(|b| b.name.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Panel {
    feed: Feed,
    executor: KindPanel,
    historic: KindPanel,
}

impl Panel {
    fn new(feed: Feed) -> Self {
        Self {
            feed,
            executor: KindPanel::default(),
            historic: KindPanel::default(),
        }
    }

    fn kind_mut(&mut self, kind: FeedKind) -> &mut KindPanel {
        match kind {
            FeedKind::Executor => &mut self.executor,
            FeedKind::Historic => &mut self.historic,
        }
    }

    fn kind(&self, kind: FeedKind) -> &KindPanel {
        match kind {
            FeedKind::Executor => &self.executor,
            FeedKind::Historic => &self.historic,
        }
    }
}

/// Per-feed presentation state, keyed by feed id.
///
/// Updates for one feed never touch another feed's panel, and updates for a
/// feed without a panel are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardState {
    policy: NotifyPolicy,
    panels: BTreeMap<FeedId, Panel>,
    dirty: bool,
}

impl BoardState {
    pub fn new(policy: NotifyPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> NotifyPolicy {
        self.policy
    }

    pub fn has_panel(&self, feed_id: FeedId) -> bool {
        self.panels.contains_key(&feed_id)
    }

    pub fn is_downloading(&self, kind: FeedKind, feed_id: FeedId) -> bool {
        self.panels
            .get(&feed_id)
            .is_some_and(|panel| panel.kind(kind).downloading)
    }

    pub fn last_result(&self, kind: FeedKind, feed_id: FeedId) -> Option<&FeedResult> {
        self.panels
            .get(&feed_id)
            .and_then(|panel| panel.kind(kind).result.as_ref())
    }

    pub fn view(&self) -> BoardView {
        BoardView {
            policy: self.policy,
            panels: self
                .panels
                .values()
                .map(|panel| PanelView {
                    feed_id: panel.feed.id(),
                    name: panel.feed.name().to_string(),
                    url: panel.feed.url().to_string(),
                    is_job: panel.feed.is_job(),
                    executor: panel.executor.view(),
                    historic: panel.historic.view(),
                })
                .collect(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Keeps panels of feeds still present, refreshing name and url, drops the
    /// rest and adds panels for new feeds. Placeholder feeds get no panel.
    pub(crate) fn prepare(&mut self, feeds: Vec<Feed>) {
        let mut next = BTreeMap::new();
        for feed in feeds.into_iter().filter(|feed| !feed.is_empty()) {
            let panel = match self.panels.remove(&feed.id()) {
                Some(mut panel) => {
                    panel.feed = feed;
                    panel
                }
                None => Panel::new(feed),
            };
            next.insert(panel.feed.id(), panel);
        }
        if next != self.panels {
            self.panels = next;
            self.dirty = true;
        }
    }

    pub(crate) fn mark_downloading(&mut self, kind: FeedKind, feed_id: FeedId) -> bool {
        let Some(panel) = self.panels.get_mut(&feed_id) else {
            return false;
        };
        let slot = panel.kind_mut(kind);
        if !slot.downloading {
            slot.downloading = true;
            self.dirty = true;
        }
        true
    }

    /// Stores the result and returns the feed along with the status of the
    /// result it replaced. `None` when the feed has no panel.
    pub(crate) fn apply_processed(
        &mut self,
        kind: FeedKind,
        feed_id: FeedId,
        result: FeedResult,
    ) -> Option<(Feed, Option<AggregateStatus>)> {
        let panel = self.panels.get_mut(&feed_id)?;
        let feed = panel.feed.clone();
        let slot = panel.kind_mut(kind);
        slot.downloading = false;
        let previous = slot.result.replace(result).map(|r| r.status);
        self.dirty = true;
        Some((feed, previous))
    }

    pub(crate) fn remove_panel(&mut self, feed_id: FeedId) -> bool {
        let removed = self.panels.remove(&feed_id).is_some();
        self.dirty |= removed;
        removed
    }

    pub(crate) fn set_policy(&mut self, policy: NotifyPolicy) {
        if self.policy != policy {
            self.policy = policy;
            self.dirty = true;
        }
    }
}
