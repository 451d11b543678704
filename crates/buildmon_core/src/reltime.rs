use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Renders how long before `now` the `timestamp` lies, e.g. `3 hours ago`.
///
/// Seven to thirty days count in weeks, rounded up; a single week reads
/// `1 week ago` rather than `1 weeks ago`. Returns `None` for timestamps in
/// the future or 31 or more days back.
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    let diff = now.signed_duration_since(timestamp).num_seconds();
    if diff < 0 {
        return None;
    }

    let days = diff / DAY;
    let text = match days {
        0 => match diff {
            d if d < MINUTE => "just now".to_string(),
            d if d < 2 * MINUTE => "1 minute ago".to_string(),
            d if d < HOUR => format!("{} minutes ago", d / MINUTE),
            d if d < 2 * HOUR => "1 hour ago".to_string(),
            d => format!("{} hours ago", d / HOUR),
        },
        1 => "Yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        7..=30 => match (days + 6) / 7 {
            1 => "1 week ago".to_string(),
            weeks => format!("{weeks} weeks ago"),
        },
        _ => return None,
    };
    Some(text)
}
