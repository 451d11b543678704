use std::fmt;
use std::sync::OnceLock;

pub type FeedId = u32;

/// Executor status endpoint polled for every feed when executor polling is on.
pub const DEFAULT_EXECUTOR_URL: &str = "http://localhost:8080/computer/api/json?depth=1";

const JOB_SEGMENT: &str = "/job/";

/// Which of the two documents of a feed a download or result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeedKind {
    Executor,
    Historic,
}

impl FeedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedKind::Executor => "executor",
            FeedKind::Historic => "historic",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint of the executor status document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorHandle {
    url: String,
}

impl ExecutorHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// One monitored target.
///
/// The executor handle is created on first access and cached for the
/// lifetime of the feed; renaming or re-pointing the feed keeps it.
#[derive(Debug, Clone)]
pub struct Feed {
    id: FeedId,
    name: String,
    url: String,
    executor: OnceLock<ExecutorHandle>,
}

impl Feed {
    pub fn new(id: FeedId, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            url: url.into(),
            executor: OnceLock::new(),
        }
    }

    pub fn id(&self) -> FeedId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// A feed without an endpoint is never polled.
    pub fn is_ignored(&self) -> bool {
        self.url.is_empty()
    }

    /// Placeholder slot with neither name nor endpoint configured.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.url.is_empty()
    }

    /// True when the endpoint points below a job path.
    pub fn is_job(&self) -> bool {
        self.url.contains(JOB_SEGMENT)
    }

    /// Returns the executor handle, creating it from `executor_url` on first use.
    pub fn executor(&self, executor_url: &str) -> &ExecutorHandle {
        self.executor
            .get_or_init(|| ExecutorHandle::new(executor_url))
    }
}

impl PartialEq for Feed {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.url == other.url
    }
}

impl Eq for Feed {}
