use std::sync::Arc;

use buildmon_core::{FeedKind, FeedResult, StatusMode};
use chrono::{DateTime, Utc};

use crate::{ExecutorFeedParser, HistoricFeedParser};

/// Source of "now" for timestamps the engine stamps itself.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Turns a raw feed document into a normalized result.
#[derive(Clone)]
pub enum FeedParser {
    Historic(HistoricFeedParser),
    Executor(ExecutorFeedParser),
}

impl FeedParser {
    /// Parser for `kind`, keeping at most `size` builds.
    pub fn for_kind(kind: FeedKind, size: usize, mode: StatusMode, clock: Clock) -> Self {
        match kind {
            FeedKind::Historic => FeedParser::Historic(HistoricFeedParser::new(size, mode)),
            FeedKind::Executor => {
                FeedParser::Executor(ExecutorFeedParser::new(size, mode, clock))
            }
        }
    }

    pub fn parse(&self, document: &str) -> FeedResult {
        match self {
            FeedParser::Historic(parser) => parser.parse(document),
            FeedParser::Executor(parser) => parser.parse(document),
        }
    }
}
