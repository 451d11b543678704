use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use buildmon_core::{Feed, FeedId, NotifyPolicy, StatusMode, DEFAULT_EXECUTOR_URL};
use thiserror::Error;

use crate::{Credentials, PersistError};

/// Everything the monitor reads from configuration besides the feed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    pub interval_minutes: u64,
    pub feed_size: usize,
    pub status_mode: StatusMode,
    pub executor_enabled: bool,
    pub executor_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub notify_policy: NotifyPolicy,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval_minutes: 5,
            feed_size: 10,
            status_mode: StatusMode::Health,
            executor_enabled: false,
            executor_url: DEFAULT_EXECUTOR_URL.to_string(),
            username: None,
            password: None,
            notify_policy: NotifyPolicy::OnChange,
        }
    }
}

impl MonitorSettings {
    /// Delay between the end of one dispatch and the start of the next.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_minutes.saturating_mul(60_000))
    }

    /// Credentials for feed requests; none unless a username is configured.
    pub fn credentials(&self) -> Option<Credentials> {
        self.username
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(|name| Credentials::new(name, self.password.clone()))
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to persist configuration: {0}")]
    Persist(#[from] PersistError),
    #[error("failed to serialize configuration: {0}")]
    Serialize(String),
}

/// Configuration collaborator owning the persisted feed list and settings.
pub trait FeedStore: Send + Sync {
    fn feeds(&self) -> Vec<Feed>;
    fn settings(&self) -> MonitorSettings;
    fn add_feed(&self, name: &str, url: &str) -> Result<Feed, StoreError>;
    /// Renames and re-points a feed. Returns false if no such feed exists.
    fn update_feed(&self, id: FeedId, name: &str, url: &str) -> Result<bool, StoreError>;
    /// Returns false if no such feed exists.
    fn remove_feed(&self, id: FeedId) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    feeds: Vec<Feed>,
    settings: MonitorSettings,
}

/// Feed store that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryFeedStore {
    state: Mutex<MemoryState>,
}

impl MemoryFeedStore {
    pub fn new(feeds: Vec<Feed>, settings: MonitorSettings) -> Self {
        Self {
            state: Mutex::new(MemoryState { feeds, settings }),
        }
    }

    pub fn set_settings(&self, settings: MonitorSettings) {
        self.lock().settings = settings;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FeedStore for MemoryFeedStore {
    fn feeds(&self) -> Vec<Feed> {
        self.lock().feeds.clone()
    }

    fn settings(&self) -> MonitorSettings {
        self.lock().settings.clone()
    }

    fn add_feed(&self, name: &str, url: &str) -> Result<Feed, StoreError> {
        let mut state = self.lock();
        let feed = Feed::new(next_feed_id(&state.feeds), name, url);
        state.feeds.push(feed.clone());
        Ok(feed)
    }

    fn update_feed(&self, id: FeedId, name: &str, url: &str) -> Result<bool, StoreError> {
        let mut state = self.lock();
        match state.feeds.iter_mut().find(|feed| feed.id() == id) {
            Some(feed) => {
                feed.rename(name);
                feed.set_url(url);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove_feed(&self, id: FeedId) -> Result<bool, StoreError> {
        let mut state = self.lock();
        let before = state.feeds.len();
        state.feeds.retain(|feed| feed.id() != id);
        Ok(state.feeds.len() != before)
    }
}

/// Smallest id above every id in use.
pub fn next_feed_id(feeds: &[Feed]) -> FeedId {
    feeds.iter().map(Feed::id).max().map_or(1, |max| max + 1)
}
