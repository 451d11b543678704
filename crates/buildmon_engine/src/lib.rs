//! Build monitor engine: feed fetching, parsing and the poll loop.
mod callback;
mod decode;
mod downloader;
mod engine;
mod executor;
mod fetch;
mod historic;
mod monitor;
mod notify;
mod parser;
mod persist;
mod scheduler;
mod signal;
mod sink;
mod store;
mod types;

pub use callback::DownloaderCallback;
pub use decode::{decode_document, DecodeError, DecodedDocument};
pub use downloader::Downloader;
pub use engine::{EngineError, MonitorEngine};
pub use executor::ExecutorFeedParser;
pub use fetch::{Credentials, FetchSettings, Fetcher, ReqwestFetcher};
pub use historic::{HistoricFeedParser, PUBLISHED_FORMAT};
pub use monitor::FeedMonitor;
pub use notify::{dispatch, ConsoleNotifier, NotificationDispatcher};
pub use parser::{system_clock, Clock, FeedParser};
pub use persist::{ensure_parent_dir, AtomicFileWriter, PersistError};
pub use scheduler::Scheduler;
pub use signal::shutdown_signal;
pub use sink::{ChannelSink, UiSink};
pub use store::{next_feed_id, FeedStore, MemoryFeedStore, MonitorSettings, StoreError};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput, MonitorEvent};
