use std::fmt;
use std::str::FromStr;

use crate::Build;

/// Per-build status token counted as a good historic build.
pub const SUCCESS_STATUS: &str = "success";
/// Per-build status token counted as free executor capacity.
pub const IDLE_STATUS: &str = "idle";
pub const UNKNOWN_STATUS: &str = "unknown";

/// Five aggregate health buckets, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HealthTier {
    Health00,
    Health20,
    Health40,
    Health60,
    Health80,
}

impl HealthTier {
    /// Buckets a success rate in percent. Thresholds are inclusive.
    pub fn from_rate(rate: u32) -> Self {
        match rate {
            80.. => HealthTier::Health80,
            60.. => HealthTier::Health60,
            40.. => HealthTier::Health40,
            20.. => HealthTier::Health20,
            _ => HealthTier::Health00,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthTier::Health00 => "health_00",
            HealthTier::Health20 => "health_20",
            HealthTier::Health40 => "health_40",
            HealthTier::Health60 => "health_60",
            HealthTier::Health80 => "health_80",
        }
    }
}

/// Status of a whole feed document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AggregateStatus {
    Unknown,
    Health(HealthTier),
    /// Status string of the newest build, as found in the feed.
    Latest(String),
}

impl AggregateStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AggregateStatus::Unknown => UNKNOWN_STATUS,
            AggregateStatus::Health(tier) => tier.as_str(),
            AggregateStatus::Latest(status) => status,
        }
    }
}

impl fmt::Display for AggregateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusMode {
    /// Status of the newest build.
    Latest,
    /// Bucketed success rate over all evaluated builds.
    #[default]
    Health,
}

impl StatusMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusMode::Latest => "latest",
            StatusMode::Health => "health",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusModeError(pub String);

impl fmt::Display for ParseStatusModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status mode {:?}", self.0)
    }
}

impl std::error::Error for ParseStatusModeError {}

impl FromStr for StatusMode {
    type Err = ParseStatusModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(StatusMode::Latest),
            "health" => Ok(StatusMode::Health),
            other => Err(ParseStatusModeError(other.to_string())),
        }
    }
}

/// Folds the outcomes of a sequence of builds into one aggregate status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthEvaluator {
    mode: StatusMode,
    success_token: &'static str,
}

impl HealthEvaluator {
    pub fn new(mode: StatusMode, success_token: &'static str) -> Self {
        Self {
            mode,
            success_token,
        }
    }

    /// `builds` must be newest first. The denominator is the number of
    /// builds given, never a configured cap.
    pub fn evaluate(&self, builds: &[Build]) -> AggregateStatus {
        let Some(newest) = builds.first() else {
            return AggregateStatus::Unknown;
        };
        match self.mode {
            StatusMode::Latest => AggregateStatus::Latest(newest.status()),
            StatusMode::Health => {
                let successes = builds
                    .iter()
                    .filter(|build| build.status() == self.success_token)
                    .count();
                let rate = successes * 100 / builds.len();
                AggregateStatus::Health(HealthTier::from_rate(rate as u32))
            }
        }
    }
}
