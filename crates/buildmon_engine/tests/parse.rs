use std::sync::Arc;

use buildmon_core::{AggregateStatus, BuildKind, FeedKind, HealthTier, StatusMode};
use buildmon_engine::{Clock, ExecutorFeedParser, FeedParser, HistoricFeedParser};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

fn atom(entries: &[(&str, &str)]) -> String {
    let mut doc = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>app all builds</title>
  <link type="text/html" href="http://ci/job/app/" rel="alternate"/>
  <updated>2024-05-02T10:00:00Z</updated>
"#,
    );
    for (i, (status, published)) in entries.iter().enumerate() {
        let number = entries.len() - i;
        doc.push_str(&format!(
            r#"  <entry>
    <title>app #{number} ({status})</title>
    <link type="text/html" href="http://ci/job/app/{number}/" rel="alternate"/>
    <id>tag:hudson.dev.java.net,2008:http://ci/job/app/:{number}</id>
    <published>{published}</published>
    <updated>{published}</updated>
  </entry>
"#
        ));
    }
    doc.push_str("</feed>\n");
    doc
}

fn fixed_clock() -> Clock {
    Arc::new(|| Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap())
}

#[test]
fn four_of_five_successes_is_health_80() {
    let doc = atom(&[
        ("SUCCESS", "2024-05-02T09:00:00Z"),
        ("SUCCESS", "2024-05-02T08:00:00Z"),
        ("FAILURE", "2024-05-02T07:00:00Z"),
        ("SUCCESS", "2024-05-02T06:00:00Z"),
        ("SUCCESS", "2024-05-02T05:00:00Z"),
    ]);
    let result = HistoricFeedParser::new(10, StatusMode::Health).parse(&doc);

    assert_eq!(result.title, "app all builds");
    assert_eq!(result.builds.len(), 5);
    assert_eq!(result.status, AggregateStatus::Health(HealthTier::Health80));
}

#[test]
fn entries_keep_document_order_and_fields() {
    let doc = atom(&[
        ("FAILURE", "2024-05-02T09:00:00Z"),
        ("SUCCESS", "2024-05-01T09:00:00Z"),
    ]);
    let result = HistoricFeedParser::new(10, StatusMode::Latest).parse(&doc);

    let newest = &result.builds[0];
    assert_eq!(newest.kind, BuildKind::Historic);
    assert_eq!(newest.name, "app #2 (FAILURE)");
    assert_eq!(newest.url, "http://ci/job/app/2/");
    assert_eq!(newest.date, Some(Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap()));
    assert_eq!(result.builds[1].name, "app #1 (SUCCESS)");
    assert_eq!(result.status, AggregateStatus::Latest("failure".to_string()));
}

#[test]
fn build_count_is_capped_by_configured_size() {
    let entries: Vec<(&str, &str)> = (0..8)
        .map(|_| ("SUCCESS", "2024-05-02T09:00:00Z"))
        .collect();
    let doc = atom(&entries);

    for size in [0, 1, 3, 8, 20] {
        let result = HistoricFeedParser::new(size, StatusMode::Health).parse(&doc);
        assert_eq!(result.builds.len(), size.min(8), "size {size}");
    }
}

#[test]
fn capped_builds_are_the_health_denominator() {
    // Newest three: 2 of 3 succeed -> 66% -> health_60.
    let doc = atom(&[
        ("SUCCESS", "2024-05-02T09:00:00Z"),
        ("FAILURE", "2024-05-02T08:00:00Z"),
        ("SUCCESS", "2024-05-02T07:00:00Z"),
        ("FAILURE", "2024-05-02T06:00:00Z"),
        ("FAILURE", "2024-05-02T05:00:00Z"),
    ]);
    let result = HistoricFeedParser::new(3, StatusMode::Health).parse(&doc);
    assert_eq!(result.status, AggregateStatus::Health(HealthTier::Health60));
}

#[test]
fn feed_without_entries_is_unknown_in_every_mode() {
    let doc = atom(&[]);
    for mode in [StatusMode::Latest, StatusMode::Health] {
        let result = HistoricFeedParser::new(10, mode).parse(&doc);
        assert_eq!(result.title, "app all builds");
        assert!(result.builds.is_empty());
        assert_eq!(result.status, AggregateStatus::Unknown);
    }
}

#[test]
fn error_pages_and_garbage_degrade_to_unknown() {
    let parser = HistoricFeedParser::new(10, StatusMode::Health);
    for doc in [
        "",
        "not xml at all",
        "<html><head><title>Error 404</title></head><body>Not found</body></html>",
    ] {
        let result = parser.parse(doc);
        assert!(result.builds.is_empty());
        assert_eq!(result.status, AggregateStatus::Unknown);
    }
}

#[test]
fn entry_with_missing_elements_still_counts() {
    let doc = r#"<feed><title>t</title><entry><published>yesterday</published></entry></feed>"#;
    let result = HistoricFeedParser::new(10, StatusMode::Latest).parse(doc);

    assert_eq!(result.builds.len(), 1);
    assert_eq!(result.builds[0].name, "");
    assert_eq!(result.builds[0].date, None);
    assert_eq!(result.status, AggregateStatus::Latest("unknown".to_string()));
}

#[test]
fn executor_slots_become_builds() {
    let doc = r#"{
        "busyExecutors": 1,
        "displayName": "Nodes",
        "totalExecutors": 4,
        "computer": [
            {
                "displayName": "master",
                "offline": false,
                "executors": [
                    {"idle": true, "number": 0, "currentExecutable": null},
                    {"idle": false, "number": 1, "progress": 40,
                     "currentExecutable": {"url": "http://ci/job/app/7/", "fullDisplayName": "app #7"}}
                ]
            },
            {
                "displayName": "agent-1",
                "offline": true,
                "executors": [{"idle": true, "number": 0}]
            },
            {
                "displayName": "agent-2",
                "offline": false,
                "executors": [{"idle": true}]
            }
        ]
    }"#;
    let parser = ExecutorFeedParser::new(10, StatusMode::Health, fixed_clock());
    let result = parser.parse(doc);

    let names: Vec<_> = result.builds.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "master #0 (IDLE)",
            "master #1: app #7 (BUSY)",
            "agent-1 #0 (OFFLINE)",
            "agent-2 #0 (IDLE)",
        ]
    );
    assert_eq!(result.title, "Nodes");
    assert_eq!(result.builds[1].url, "http://ci/job/app/7/");
    assert!(result.builds.iter().all(|b| b.kind == BuildKind::Executor));
    // 2 of 4 slots idle.
    assert_eq!(result.status, AggregateStatus::Health(HealthTier::Health40));
}

#[test]
fn executor_parser_handles_invalid_json() {
    let parser = FeedParser::for_kind(FeedKind::Executor, 10, StatusMode::Health, fixed_clock());
    let result = parser.parse("<html>login required</html>");
    assert!(result.builds.is_empty());
    assert_eq!(result.status, AggregateStatus::Unknown);
}

#[test]
fn executor_latest_mode_uses_first_slot() {
    let doc = r#"{"computer":[{"displayName":"master","executors":[{"idle":false},{"idle":true}]}]}"#;
    let parser = ExecutorFeedParser::new(1, StatusMode::Latest, fixed_clock());
    let result = parser.parse(doc);

    assert_eq!(result.title, "Executors");
    assert_eq!(result.builds.len(), 1);
    assert_eq!(result.status, AggregateStatus::Latest("busy".to_string()));
}

#[test]
fn empty_self_closing_title_does_not_swallow_later_entries() {
    let doc = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>app all builds</title>
<entry><title/><link href="http://ci/job/app/3/" rel="alternate"/><published>2024-05-02T09:00:00Z</published></entry>
<entry><title>app #2 (SUCCESS)</title><link href="http://ci/job/app/2/" rel="alternate"/><published>2024-05-02T08:00:00Z</published></entry>
<entry><title>app #1 (SUCCESS)</title><link href="http://ci/job/app/1/" rel="alternate"/><published>2024-05-02T07:00:00Z</published></entry>
</feed>"#;
    let result = HistoricFeedParser::new(10, StatusMode::Health).parse(doc);

    let names: Vec<_> = result.builds.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["", "app #2 (SUCCESS)", "app #1 (SUCCESS)"]);
    assert_eq!(result.builds[0].url, "http://ci/job/app/3/");
    // 2 of 3 -> 66%.
    assert_eq!(result.status, AggregateStatus::Health(HealthTier::Health60));
}

#[test]
fn cdata_titles_read_as_text() {
    let doc = r#"<feed><title><![CDATA[app & friends]]></title>
<entry><title><![CDATA[app #1 (SUCCESS)]]></title><published>2024-05-02T09:00:00Z</published></entry>
</feed>"#;
    let result = HistoricFeedParser::new(10, StatusMode::Latest).parse(doc);

    assert_eq!(result.title, "app & friends");
    assert_eq!(result.builds[0].name, "app #1 (SUCCESS)");
    assert_eq!(result.status, AggregateStatus::Latest("success".to_string()));
}

#[test]
fn prefixed_atom_elements_match_by_local_name() {
    let doc = r#"<a:feed xmlns:a="http://www.w3.org/2005/Atom">
<a:title>app all builds</a:title>
<a:entry><a:title>app #1 (FAILURE)</a:title><a:link href="http://ci/job/app/1/"/><a:published>2024-05-02T09:00:00Z</a:published></a:entry>
</a:feed>"#;
    let result = HistoricFeedParser::new(10, StatusMode::Health).parse(doc);

    assert_eq!(result.title, "app all builds");
    assert_eq!(result.builds.len(), 1);
    assert_eq!(result.builds[0].url, "http://ci/job/app/1/");
    assert_eq!(
        result.builds[0].date,
        Some(Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap())
    );
    assert_eq!(result.status, AggregateStatus::Health(HealthTier::Health00));
}
