use buildmon_core::{Build, FeedResult, HealthEvaluator, StatusMode, SUCCESS_STATUS};
use chrono::{DateTime, NaiveDateTime, Utc};
use monitor_logging::monitor_debug;
use roxmltree::{Document, Node};

/// Timestamp format of `published` elements.
pub const PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parses a job's Atom build history into its newest builds.
///
/// Elements are matched by local name, so prefixed and default-namespace
/// Atom read the same. Never fails: a document that is not XML, or lacks the
/// expected elements, yields fewer or no builds and an `unknown` status.
#[derive(Debug, Clone, Copy)]
pub struct HistoricFeedParser {
    size: usize,
    evaluator: HealthEvaluator,
}

impl HistoricFeedParser {
    pub fn new(size: usize, mode: StatusMode) -> Self {
        Self {
            size,
            evaluator: HealthEvaluator::new(mode, SUCCESS_STATUS),
        }
    }

    pub fn parse(&self, document: &str) -> FeedResult {
        let doc = match Document::parse(document) {
            Ok(doc) => doc,
            Err(err) => {
                monitor_debug!("historic feed is not well-formed XML: {}", err);
                return FeedResult::unknown("");
            }
        };
        let root = doc.root_element();
        if !is_named(root, "feed") {
            monitor_debug!("historic feed root is <{}>, not <feed>", root.tag_name().name());
            return FeedResult::unknown("");
        }

        let title = child(root, "title").map(text_of).unwrap_or_default();

        // Entries are taken in document order; the feed lists newest first.
        let builds: Vec<Build> = root
            .children()
            .filter(|node| is_named(*node, "entry"))
            .take(self.size)
            .map(|entry| {
                let name = child(entry, "title").map(text_of).unwrap_or_default();
                let url = entry_link(entry).unwrap_or_default();
                let date = child(entry, "published").and_then(|node| parse_published(&text_of(node)));
                Build::historic(name, url, date)
            })
            .collect();

        if builds.is_empty() {
            monitor_debug!("historic feed {:?} has no entries", title);
        }
        let status = self.evaluator.evaluate(&builds);
        FeedResult::new(title, builds, status)
    }
}

fn is_named(node: Node<'_, '_>, local: &str) -> bool {
    node.is_element() && node.tag_name().name() == local
}

fn child<'a, 'input>(parent: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    parent.children().find(|node| is_named(*node, local))
}

/// Concatenated text and CDATA content, trimmed.
fn text_of(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Prefers the `alternate` link, falling back to the first link with an href.
fn entry_link(entry: Node<'_, '_>) -> Option<String> {
    let links: Vec<Node<'_, '_>> = entry
        .children()
        .filter(|node| is_named(*node, "link") && node.has_attribute("href"))
        .collect();
    links
        .iter()
        .find(|link| {
            link.attribute("rel")
                .map_or(true, |rel| rel.eq_ignore_ascii_case("alternate"))
        })
        .or_else(|| links.first())
        .and_then(|link| link.attribute("href"))
        .map(|href| href.trim().to_string())
}

fn parse_published(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text.trim(), PUBLISHED_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
