use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use buildmon_core::{Feed, FeedId, NotifyPolicy, StatusMode, DEFAULT_EXECUTOR_URL};
use buildmon_engine::{next_feed_id, AtomicFileWriter, FeedStore, MonitorSettings, StoreError};
use monitor_logging::{monitor_info, monitor_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_ENV: &str = "BUILDMON_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "buildmon.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Explicit argument wins, then the environment, then the working directory.
pub fn config_path(arg: Option<PathBuf>, env: Option<String>) -> PathBuf {
    arg.filter(|path| !path.as_os_str().is_empty())
        .or_else(|| env.filter(|path| !path.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(".").join(DEFAULT_CONFIG_FILE))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PersistedFeed {
    id: FeedId,
    name: String,
    url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct PersistedConfig {
    interval_minutes: u64,
    feed_size: usize,
    status_mode: String,
    executor_enabled: bool,
    executor_url: String,
    username: Option<String>,
    password: Option<String>,
    notify_policy: String,
    feeds: Vec<PersistedFeed>,
}

impl Default for PersistedConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 5,
            feed_size: 10,
            status_mode: "health".to_string(),
            executor_enabled: false,
            executor_url: DEFAULT_EXECUTOR_URL.to_string(),
            username: None,
            password: None,
            notify_policy: "on_change".to_string(),
            feeds: Vec::new(),
        }
    }
}

impl PersistedConfig {
    fn settings(&self) -> MonitorSettings {
        let status_mode = self.status_mode.parse().unwrap_or_else(|err| {
            monitor_warn!("{}; using health mode", err);
            StatusMode::Health
        });
        let notify_policy = self.notify_policy.parse().unwrap_or_else(|err| {
            monitor_warn!("{}; notifying on change", err);
            NotifyPolicy::OnChange
        });
        let executor_url = if self.executor_url.trim().is_empty() {
            DEFAULT_EXECUTOR_URL.to_string()
        } else {
            self.executor_url.clone()
        };
        MonitorSettings {
            interval_minutes: self.interval_minutes.max(1),
            feed_size: self.feed_size,
            status_mode,
            executor_enabled: self.executor_enabled,
            executor_url,
            username: self.username.clone(),
            password: self.password.clone(),
            notify_policy,
        }
    }

    fn feeds(&self) -> Vec<Feed> {
        self.feeds
            .iter()
            .map(|feed| Feed::new(feed.id, feed.name.clone(), feed.url.clone()))
            .collect()
    }
}

/// Size and modification time, enough to notice an edit from elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

fn stamp(path: &Path) -> Option<FileStamp> {
    let meta = fs::metadata(path).ok()?;
    Some(FileStamp {
        modified: meta.modified().ok(),
        len: meta.len(),
    })
}

fn read_config(path: &Path) -> Result<PersistedConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(text) => ron::from_str(&text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            monitor_info!("no configuration at {:?}; starting with defaults", path);
            Ok(PersistedConfig::default())
        }
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

struct Loaded {
    config: PersistedConfig,
    stamp: Option<FileStamp>,
}

/// Feed store backed by a RON file, rewritten atomically on every edit.
///
/// Reads notice when the file was changed by another process and reload it,
/// so a running monitor sees feeds edited from the command line.
pub struct RonFeedStore {
    writer: AtomicFileWriter,
    loaded: Mutex<Loaded>,
}

impl RonFeedStore {
    /// Loads `path`; a missing file yields the defaults and no feeds.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let stamp = stamp(&path);
        let config = read_config(&path)?;
        Ok(Self {
            writer: AtomicFileWriter::new(path),
            loaded: Mutex::new(Loaded { config, stamp }),
        })
    }

    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    /// The configuration as currently on disk. A file that vanished or no
    /// longer parses leaves the last good configuration in place.
    fn current(&self) -> MutexGuard<'_, Loaded> {
        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        let now = stamp(self.path());
        if now != loaded.stamp {
            loaded.stamp = now;
            if now.is_some() {
                match read_config(self.path()) {
                    Ok(config) => {
                        monitor_info!("reloaded configuration from {:?}", self.path());
                        loaded.config = config;
                    }
                    Err(err) => monitor_warn!("{}; keeping previous configuration", err),
                }
            }
        }
        loaded
    }

    fn save(&self, config: &PersistedConfig) -> Result<(), StoreError> {
        let content = ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::new())
            .map_err(|err| StoreError::Serialize(err.to_string()))?;
        self.writer.write(&content)?;
        Ok(())
    }

    /// Applies `edit` to a copy and commits it only once the file is written.
    fn edit<T>(
        &self,
        edit: impl FnOnce(&mut PersistedConfig) -> Option<T>,
    ) -> Result<Option<T>, StoreError> {
        let mut loaded = self.current();
        let mut next = loaded.config.clone();
        let Some(value) = edit(&mut next) else {
            return Ok(None);
        };
        self.save(&next)?;
        loaded.config = next;
        loaded.stamp = stamp(self.path());
        Ok(Some(value))
    }
}

impl FeedStore for RonFeedStore {
    fn feeds(&self) -> Vec<Feed> {
        self.current().config.feeds()
    }

    fn settings(&self) -> MonitorSettings {
        self.current().config.settings()
    }

    fn add_feed(&self, name: &str, url: &str) -> Result<Feed, StoreError> {
        let added = self.edit(|config| {
            let feed = Feed::new(next_feed_id(&config.feeds()), name, url);
            config.feeds.push(PersistedFeed {
                id: feed.id(),
                name: name.to_string(),
                url: url.to_string(),
            });
            Some(feed)
        })?;
        added.ok_or_else(|| StoreError::Serialize("feed was not added".to_string()))
    }

    fn update_feed(&self, id: FeedId, name: &str, url: &str) -> Result<bool, StoreError> {
        let updated = self.edit(|config| {
            let feed = config.feeds.iter_mut().find(|feed| feed.id == id)?;
            feed.name = name.to_string();
            feed.url = url.to_string();
            Some(())
        })?;
        Ok(updated.is_some())
    }

    fn remove_feed(&self, id: FeedId) -> Result<bool, StoreError> {
        let removed = self.edit(|config| {
            let index = config.feeds.iter().position(|feed| feed.id == id)?;
            config.feeds.remove(index);
            Some(())
        })?;
        Ok(removed.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn path_prefers_argument_then_environment() {
        assert_eq!(
            config_path(Some(PathBuf::from("a.ron")), Some("b.ron".into())),
            PathBuf::from("a.ron")
        );
        assert_eq!(config_path(None, Some("b.ron".into())), PathBuf::from("b.ron"));
        assert_eq!(config_path(None, None), PathBuf::from("./buildmon.ron"));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = RonFeedStore::load(dir.path().join("buildmon.ron")).unwrap();

        assert!(store.feeds().is_empty());
        assert_eq!(store.settings(), MonitorSettings::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn settings_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buildmon.ron");
        fs::write(
            &path,
            r#"(
                interval_minutes: 0,
                feed_size: 3,
                status_mode: "latest",
                executor_enabled: true,
                executor_url: "",
                notify_policy: "sometimes",
                feeds: [(id: 7, name: "app", url: "http://ci/job/app/rssAll")],
            )"#,
        )
        .unwrap();

        let store = RonFeedStore::load(&path).unwrap();
        let settings = store.settings();
        assert_eq!(settings.interval_minutes, 1);
        assert_eq!(settings.feed_size, 3);
        assert_eq!(settings.status_mode, StatusMode::Latest);
        assert_eq!(settings.executor_url, DEFAULT_EXECUTOR_URL);
        assert_eq!(settings.notify_policy, NotifyPolicy::OnChange);
        assert_eq!(store.feeds(), vec![Feed::new(7, "app", "http://ci/job/app/rssAll")]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buildmon.ron");
        fs::write(&path, "(feeds: [oops").unwrap();

        assert!(matches!(
            RonFeedStore::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn edits_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("buildmon.ron");
        let store = RonFeedStore::load(&path).unwrap();

        let app = store.add_feed("app", "http://ci/job/app/rssAll").unwrap();
        let lib = store.add_feed("lib", "http://ci/job/lib/rssAll").unwrap();
        assert_eq!((app.id(), lib.id()), (1, 2));
        assert!(store.update_feed(1, "app-main", "http://ci/job/app-main/rssAll").unwrap());
        assert!(store.remove_feed(2).unwrap());
        assert!(!store.remove_feed(2).unwrap());
        assert!(!store.update_feed(9, "x", "y").unwrap());

        let reloaded = RonFeedStore::load(&path).unwrap();
        assert_eq!(
            reloaded.feeds(),
            vec![Feed::new(1, "app-main", "http://ci/job/app-main/rssAll")]
        );
    }

    #[test]
    fn edits_from_another_process_are_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buildmon.ron");
        let store = RonFeedStore::load(&path).unwrap();
        store.add_feed("app", "http://ci/job/app/rssAll").unwrap();
        assert_eq!(store.feeds().len(), 1);

        // Another invocation edits the same file.
        let other = RonFeedStore::load(&path).unwrap();
        other.add_feed("library", "http://ci/job/library/rssAll").unwrap();
        other.remove_feed(1).unwrap();

        assert_eq!(
            store.feeds(),
            vec![Feed::new(2, "library", "http://ci/job/library/rssAll")]
        );
    }

    #[test]
    fn broken_edit_keeps_last_good_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buildmon.ron");
        let store = RonFeedStore::load(&path).unwrap();
        store.add_feed("app", "http://ci/job/app/rssAll").unwrap();

        fs::write(&path, "(feeds: [oops").unwrap();
        assert_eq!(store.feeds(), vec![Feed::new(1, "app", "http://ci/job/app/rssAll")]);

        fs::write(&path, "(interval_minutes: 7, feeds: [])").unwrap();
        assert!(store.feeds().is_empty());
        assert_eq!(store.settings().interval_minutes, 7);
    }
}
