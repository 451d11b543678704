use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use buildmon_core::{Feed, FeedId, FeedKind};
use monitor_logging::{monitor_debug, monitor_warn};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::{decode_document, Credentials, DownloaderCallback, Fetcher};

type InFlightKey = (FeedId, FeedKind);

struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Issues non-blocking fetches and hands their documents to a callback.
///
/// At most one fetch per feed and kind is live: issuing a new one cancels the
/// previous fetch, whose callback then never runs.
pub struct Downloader {
    fetcher: Arc<dyn Fetcher>,
    runtime: Handle,
    in_flight: Arc<Mutex<HashMap<InFlightKey, InFlight>>>,
    generation: AtomicU64,
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn Fetcher>, runtime: Handle) -> Self {
        Self {
            fetcher,
            runtime,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    /// Number of fetches issued and not yet completed or superseded.
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }

    /// Marks the feed as downloading, then fetches `url` in the background.
    /// Returns immediately.
    pub fn download(
        &self,
        callback: Arc<DownloaderCallback>,
        url: &str,
        feed: &Feed,
        credentials: Option<Credentials>,
    ) {
        callback.downloading(feed);

        let key = (feed.id(), callback.kind());
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let previous = lock(&self.in_flight).insert(
            key,
            InFlight {
                generation,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            monitor_debug!(
                "{} feed {} still in flight; cancelling previous fetch",
                callback.kind(),
                feed.id()
            );
            previous.token.cancel();
        }

        let fetcher = self.fetcher.clone();
        let in_flight = self.in_flight.clone();
        let url = url.to_string();
        let feed = feed.clone();
        self.runtime.spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => return,
                outcome = fetcher.fetch(&url, credentials.as_ref()) => outcome,
            };
            {
                let mut in_flight = lock(&in_flight);
                if in_flight
                    .get(&key)
                    .is_some_and(|entry| entry.generation == generation)
                {
                    in_flight.remove(&key);
                }
            }

            let document = match outcome {
                Ok(output) => {
                    match decode_document(&output.bytes, output.metadata.content_type.as_deref())
                    {
                        Ok(decoded) => decoded.text,
                        Err(err) => {
                            monitor_warn!("feed {} from {}: {}", feed.id(), url, err);
                            String::from_utf8_lossy(&output.bytes).into_owned()
                        }
                    }
                }
                Err(err) => {
                    monitor_warn!(
                        "{} fetch for feed {} from {} failed: {}",
                        callback.kind(),
                        feed.id(),
                        url,
                        err
                    );
                    err.body.unwrap_or_default()
                }
            };
            callback.process(&document, &feed);
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
