//! Command-line interface definitions for the data collector.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Process configuration can be provided via command-line flags or
//! environment variables and is resolved once at start-up.

use crate::aggregators::google_news::DEFAULT_BASE_URL;
use crate::stores::StoreKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the data collector.
///
/// # Examples
///
/// ```sh
/// # Store a payload in the in-memory store and print what was written
/// echo '{"id": "abc", "data": {"price": 3.14}}' | data_collector --dump generic
///
/// # Collect the default Business feed into Redis
/// RECORD_STORE=redis TABLE_NAME=news data_collector news --event event.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Environment tag stored on generic records
    #[arg(long, env = "ENVIRONMENT", default_value = "dev")]
    pub environment: String,

    /// Store target identifier (key namespace)
    #[arg(long, env = "TABLE_NAME", default_value = "records")]
    pub table: String,

    /// Record store backend
    #[arg(long, env = "RECORD_STORE", value_enum, default_value_t = StoreKind::Memory)]
    pub store: StoreKind,

    /// Redis connection URL (used with `--store redis`)
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1/")]
    pub redis_url: String,

    /// Root of the Google News RSS feeds
    #[arg(long, env = "NEWS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub news_base_url: String,

    /// Print every stored record after the run (memory store only)
    #[arg(long)]
    pub dump: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store one `{id, data}` payload
    Generic {
        /// Event JSON file; `-` or omitted reads stdin
        #[arg(short, long)]
        event: Option<PathBuf>,
    },
    /// Collect one news feed, storing each article by URL
    News {
        /// Event JSON file; `-` or omitted reads stdin
        #[arg(short, long)]
        event: Option<PathBuf>,
    },
}

impl Cli {
    /// True when records go to the in-process store and are never shown,
    /// so nothing outlives the run.
    pub fn discards_records(&self) -> bool {
        self.store == StoreKind::Memory && !self.dump
    }
}

impl Command {
    /// The event file, or `None` for stdin.
    pub fn event_path(&self) -> Option<&PathBuf> {
        let path = match self {
            Command::Generic { event } | Command::News { event } => event.as_ref(),
        };
        path.filter(|p| p.as_os_str() != "-")
    }
}
