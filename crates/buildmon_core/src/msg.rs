use crate::{Feed, FeedId, FeedKind, FeedResult, NotifyPolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A poll cycle is starting with this feed set; rebuild the panels.
    Prepare(Vec<Feed>),
    /// A download for the feed was issued.
    Downloading { kind: FeedKind, feed_id: FeedId },
    /// A download completed and its document was parsed.
    Processed {
        kind: FeedKind,
        feed_id: FeedId,
        result: FeedResult,
    },
    /// The feed was removed by the user.
    RemovePanel { feed_id: FeedId },
    /// User changed when notifications fire.
    PolicyChanged(NotifyPolicy),
}
