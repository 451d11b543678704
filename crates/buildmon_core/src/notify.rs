use std::fmt;
use std::str::FromStr;

use crate::{AggregateStatus, FeedKind, HealthTier};

/// When the board turns a processed result into alert and sound effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyPolicy {
    Never,
    /// Every processed result with at least one build.
    EveryPoll,
    /// Only when the aggregate status differs from the previous result.
    #[default]
    OnChange,
}

impl NotifyPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            NotifyPolicy::Never => "never",
            NotifyPolicy::EveryPoll => "every_poll",
            NotifyPolicy::OnChange => "on_change",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNotifyPolicyError(pub String);

impl fmt::Display for ParseNotifyPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown notify policy {:?}", self.0)
    }
}

impl std::error::Error for ParseNotifyPolicyError {}

impl FromStr for NotifyPolicy {
    type Err = ParseNotifyPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "never" => Ok(NotifyPolicy::Never),
            "every_poll" => Ok(NotifyPolicy::EveryPoll),
            "on_change" => Ok(NotifyPolicy::OnChange),
            other => Err(ParseNotifyPolicyError(other.to_string())),
        }
    }
}

/// Icon name for an alert about a build with the given per-build status.
pub fn alert_icon(kind: FeedKind, status: &str) -> &'static str {
    match kind {
        FeedKind::Executor => match status {
            "idle" => "executor-idle",
            "busy" => "executor-busy",
            "offline" => "executor-offline",
            _ => "executor-unknown",
        },
        FeedKind::Historic => match status {
            "success" | "stable" | "back to normal" => "build-success",
            "unstable" => "build-unstable",
            "aborted" => "build-aborted",
            s if s == "failure" || s.starts_with("broken") => "build-failure",
            _ => "build-unknown",
        },
    }
}

/// Sound cue for a feed whose aggregate status is `status`; `None` is silence.
pub fn sound_for(status: &AggregateStatus) -> Option<&'static str> {
    match status {
        AggregateStatus::Unknown => None,
        AggregateStatus::Health(HealthTier::Health80) => Some("success"),
        AggregateStatus::Health(HealthTier::Health60 | HealthTier::Health40) => Some("warning"),
        AggregateStatus::Health(HealthTier::Health20 | HealthTier::Health00) => Some("failure"),
        AggregateStatus::Latest(status) => match alert_icon(FeedKind::Historic, status) {
            "build-success" => Some("success"),
            "build-unstable" => Some("warning"),
            "build-failure" => Some("failure"),
            _ => None,
        },
    }
}
