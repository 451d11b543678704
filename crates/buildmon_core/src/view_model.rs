use crate::{FeedId, NotifyPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardView {
    pub policy: NotifyPolicy,
    pub panels: Vec<PanelView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub feed_id: FeedId,
    pub name: String,
    pub url: String,
    pub is_job: bool,
    pub executor: KindView,
    pub historic: KindView,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KindView {
    pub downloading: bool,
    /// Aggregate status of the last processed result.
    pub status: Option<String>,
    pub title: Option<String>,
    pub build_count: usize,
    pub newest: Option<String>,
}
