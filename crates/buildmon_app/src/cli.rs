//! Command line for the build monitor.
//!
//! With no subcommand the monitor runs until interrupted. The subcommands
//! edit the feed list in the configuration file and exit; a running monitor
//! picks the edits up on its next cycle.

use std::path::PathBuf;

use buildmon_core::FeedId;
use clap::{Parser, Subcommand};

/// Watch CI build feeds and report their health.
#[derive(Debug, Parser)]
#[command(name = "buildmon")]
pub(crate) struct Cli {
    /// Configuration file. Defaults to $BUILDMON_CONFIG, then ./buildmon.ron.
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub(crate) enum Command {
    /// Print the configured feeds.
    List,
    /// Add a feed. An empty url keeps the feed but never polls it.
    Add { name: String, url: String },
    /// Rename a feed and point it at a new url.
    Edit { id: FeedId, name: String, url: String },
    /// Remove a feed.
    Remove { id: FeedId },
}
