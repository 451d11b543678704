use chrono::{DateTime, Utc};

use crate::{relative_time, AggregateStatus, UNKNOWN_STATUS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    /// Past build of a job, taken from its history feed.
    Historic,
    /// Current state of one executor slot.
    Executor,
}

/// One entry of a feed document. The status is derived from the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Build {
    pub kind: BuildKind,
    pub name: String,
    pub url: String,
    pub date: Option<DateTime<Utc>>,
}

impl Build {
    pub fn historic(
        name: impl Into<String>,
        url: impl Into<String>,
        date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            kind: BuildKind::Historic,
            name: name.into(),
            url: url.into(),
            date,
        }
    }

    pub fn executor(name: impl Into<String>, url: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            kind: BuildKind::Executor,
            name: name.into(),
            url: url.into(),
            date: Some(date),
        }
    }

    /// Lower-cased parenthesized token of the name, `unknown` when absent.
    pub fn status(&self) -> String {
        status_token(&self.name)
            .unwrap_or(UNKNOWN_STATUS)
            .to_lowercase()
    }

    /// Display line for alerts: the name, plus how long ago a historic build ran.
    pub fn details(&self, now: DateTime<Utc>) -> String {
        let when = match self.kind {
            BuildKind::Historic => self.date.and_then(|date| relative_time(date, now)),
            BuildKind::Executor => None,
        };
        match when {
            Some(when) => format!("{} - {}", self.name, when),
            None => self.name.clone(),
        }
    }
}

/// Extracts the last `( ... )` group of a build name, e.g. `SUCCESS` from
/// `app #42 (SUCCESS)`.
pub fn status_token(name: &str) -> Option<&str> {
    let open = name.rfind('(')?;
    let rest = &name[open + 1..];
    let close = rest.find(')')?;
    let token = rest[..close].trim();
    (!token.is_empty()).then_some(token)
}

/// Normalized outcome of parsing one feed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResult {
    pub title: String,
    /// Newest first.
    pub builds: Vec<Build>,
    pub status: AggregateStatus,
}

impl FeedResult {
    pub fn new(title: impl Into<String>, builds: Vec<Build>, status: AggregateStatus) -> Self {
        Self {
            title: title.into(),
            builds,
            status,
        }
    }

    /// Result of a document nothing could be read from.
    pub fn unknown(title: impl Into<String>) -> Self {
        Self::new(title, Vec::new(), AggregateStatus::Unknown)
    }

    pub fn newest(&self) -> Option<&Build> {
        self.builds.first()
    }
}
