use crate::{AggregateStatus, Build, Feed, FeedKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    DisplayAlert {
        kind: FeedKind,
        title: String,
        feed: Feed,
        build: Build,
    },
    PlaySound {
        feed: Feed,
        status: AggregateStatus,
    },
}
