use std::sync::Arc;
use std::time::Duration;

use buildmon_core::Feed;
use buildmon_engine::{FetchSettings, MemoryFeedStore, MonitorEngine, MonitorEvent, MonitorSettings};

fn engine_with(feeds: Vec<Feed>) -> MonitorEngine {
    let store = Arc::new(MemoryFeedStore::new(feeds, MonitorSettings::default()));
    MonitorEngine::start(store, FetchSettings::default()).unwrap()
}

#[test]
fn first_cycle_prepares_the_configured_feeds() {
    let engine = engine_with(vec![Feed::new(1, "parked", "")]);

    let event = engine.recv_timeout(Duration::from_secs(5));
    assert_eq!(
        event,
        Some(MonitorEvent::Prepared(vec![Feed::new(1, "parked", "")]))
    );
    engine.shutdown();
}

#[test]
fn requested_stop_ends_the_scheduler_mid_interval() {
    let engine = engine_with(Vec::new());
    engine.stop_on_signal();
    assert!(engine.recv_timeout(Duration::from_secs(5)).is_some());
    assert!(!engine.is_stopping());

    // The scheduler is asleep for the five minute interval; stopping must
    // not wait it out.
    engine.request_stop();
    assert!(engine.is_stopping());
    let (done_tx, done_rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        engine.shutdown();
        done_tx.send(()).unwrap();
    });
    assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
}
