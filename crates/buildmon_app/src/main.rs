//! Build monitor: polls CI feeds and reports their health.
mod board;
mod cli;
mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use buildmon_engine::{
    system_clock, ConsoleNotifier, FeedStore, FetchSettings, MonitorEngine, MonitorEvent,
};
use clap::Parser;
use log::LevelFilter;
use monitor_logging::{monitor_info, LogDestination};

use crate::board::{msg_for, Board};
use crate::cli::{Cli, Command};
use crate::config::RonFeedStore;

const EVENT_WAIT: Duration = Duration::from_millis(250);

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let path = config::config_path(cli.config, std::env::var(config::CONFIG_ENV).ok());
    let store = RonFeedStore::load(&path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;

    match cli.command {
        None => {
            monitor_logging::initialize(LogDestination::Both, LevelFilter::Info);
            run(Arc::new(store))
        }
        Some(command) => {
            monitor_logging::initialize(LogDestination::Terminal, LevelFilter::Warn);
            edit(&store, command)
        }
    }
}

fn run(store: Arc<RonFeedStore>) -> anyhow::Result<()> {
    monitor_info!(
        "monitoring {} feeds from {:?}",
        store.feeds().len(),
        store.path()
    );
    let engine = MonitorEngine::start(store.clone(), FetchSettings::default())
        .context("starting monitor engine")?;
    let notifier = ConsoleNotifier::stderr(system_clock());
    let mut board = Board::new(store.settings().notify_policy, &notifier);
    engine.stop_on_signal();

    while !engine.is_stopping() {
        if let Some(event) = engine.recv_timeout(EVENT_WAIT) {
            if matches!(event, MonitorEvent::Prepared(_)) {
                board.set_policy(store.settings().notify_policy);
            }
            board.apply(msg_for(event));
            while let Some(event) = engine.try_recv() {
                board.apply(msg_for(event));
            }
        }
        board.render();
    }
    engine.shutdown();
    monitor_info!("monitor stopped");
    Ok(())
}

fn edit(store: &RonFeedStore, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List => {}
        Command::Add { name, url } => {
            let feed = store.add_feed(&name, &url)?;
            println!("added feed {}", feed.id());
        }
        Command::Edit { id, name, url } => {
            anyhow::ensure!(store.update_feed(id, &name, &url)?, "no feed with id {id}");
        }
        Command::Remove { id } => {
            anyhow::ensure!(store.remove_feed(id)?, "no feed with id {id}");
        }
    }
    for feed in store.feeds() {
        let url = if feed.is_ignored() { "(ignored)" } else { feed.url() };
        println!("{:>4}  {}  {}", feed.id(), feed.name(), url);
    }
    Ok(())
}
