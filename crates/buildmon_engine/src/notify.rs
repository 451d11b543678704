use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use buildmon_core::{alert_icon, sound_for, AggregateStatus, Build, Effect, Feed, FeedKind};
use monitor_logging::{monitor_info, monitor_warn};

use crate::Clock;

/// Side-effecting alert and sound primitives. Implementations do no
/// filtering; deciding when to notify is up to the caller.
pub trait NotificationDispatcher: Send + Sync {
    fn display_alert(&self, kind: FeedKind, title: &str, feed: &Feed, build: &Build);
    fn play_sound(&self, feed: &Feed, status: &AggregateStatus);
}

/// Executes a board effect against a dispatcher.
pub fn dispatch(dispatcher: &dyn NotificationDispatcher, effect: &Effect) {
    match effect {
        Effect::DisplayAlert {
            kind,
            title,
            feed,
            build,
        } => dispatcher.display_alert(*kind, title, feed, build),
        Effect::PlaySound { feed, status } => dispatcher.play_sound(feed, status),
    }
}

/// Writes alerts as text lines and sounds as a terminal bell.
pub struct ConsoleNotifier<W: Write + Send> {
    out: Mutex<W>,
    clock: Clock,
}

impl ConsoleNotifier<io::Stderr> {
    pub fn stderr(clock: Clock) -> Self {
        Self::new(io::stderr(), clock)
    }
}

impl<W: Write + Send> ConsoleNotifier<W> {
    pub fn new(out: W, clock: Clock) -> Self {
        Self {
            out: Mutex::new(out),
            clock,
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, bytes: &[u8]) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = out.write_all(bytes).and_then(|()| out.flush()) {
            monitor_warn!("failed to write notification: {}", err);
        }
    }
}

impl<W: Write + Send> NotificationDispatcher for ConsoleNotifier<W> {
    fn display_alert(&self, kind: FeedKind, title: &str, feed: &Feed, build: &Build) {
        let icon = alert_icon(kind, &build.status());
        let details = build.details((self.clock)());
        monitor_info!("alert for feed {} [{}] {}: {}", feed.id(), icon, title, details);
        self.write(format!("[{icon}] {title}: {details}\n").as_bytes());
    }

    fn play_sound(&self, feed: &Feed, status: &AggregateStatus) {
        if let Some(sound) = sound_for(status) {
            monitor_info!("sound {} for feed {} ({})", sound, feed.id(), status);
            self.write(b"\x07");
        }
    }
}
