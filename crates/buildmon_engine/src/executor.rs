use buildmon_core::{Build, FeedResult, HealthEvaluator, StatusMode, IDLE_STATUS};
use monitor_logging::monitor_debug;
use serde::Deserialize;

use crate::Clock;

const DEFAULT_TITLE: &str = "Executors";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComputerSet {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    computer: Vec<Computer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Computer {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    offline: bool,
    #[serde(default)]
    executors: Vec<Executor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Executor {
    #[serde(default)]
    idle: bool,
    number: Option<u32>,
    current_executable: Option<Executable>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Executable {
    #[serde(default)]
    url: String,
    full_display_name: Option<String>,
}

/// Parses the computer API document into one build per executor slot.
///
/// Idle slots count as successes, so the health tier reflects free capacity.
#[derive(Clone)]
pub struct ExecutorFeedParser {
    size: usize,
    evaluator: HealthEvaluator,
    clock: Clock,
}

impl ExecutorFeedParser {
    pub fn new(size: usize, mode: StatusMode, clock: Clock) -> Self {
        Self {
            size,
            evaluator: HealthEvaluator::new(mode, IDLE_STATUS),
            clock,
        }
    }

    pub fn parse(&self, document: &str) -> FeedResult {
        let set: ComputerSet = match serde_json::from_str(document) {
            Ok(set) => set,
            Err(err) => {
                monitor_debug!("executor document unreadable: {}", err);
                return FeedResult::unknown("");
            }
        };

        let now = (self.clock)();
        let builds: Vec<Build> = set
            .computer
            .iter()
            .flat_map(|computer| {
                computer
                    .executors
                    .iter()
                    .enumerate()
                    .map(move |(index, executor)| (computer, index, executor))
            })
            .take(self.size)
            .map(|(computer, index, executor)| {
                let number = executor.number.unwrap_or(index as u32);
                let slot = format!("{} #{}", computer.display_name, number);
                match (&executor.current_executable, computer.offline, executor.idle) {
                    (_, true, _) => Build::executor(format!("{slot} (OFFLINE)"), "", now),
                    (Some(exe), false, false) => {
                        let name = match exe.full_display_name.as_deref() {
                            Some(job) => format!("{slot}: {job} (BUSY)"),
                            None => format!("{slot} (BUSY)"),
                        };
                        Build::executor(name, exe.url.clone(), now)
                    }
                    (None, false, false) => Build::executor(format!("{slot} (BUSY)"), "", now),
                    (_, false, true) => Build::executor(format!("{slot} (IDLE)"), "", now),
                }
            })
            .collect();

        let title = if set.display_name.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            set.display_name
        };
        let status = self.evaluator.evaluate(&builds);
        FeedResult::new(title, builds, status)
    }
}
