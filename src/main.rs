//! # Data Collector
//!
//! An ingestion endpoint that normalizes incoming events into records and
//! writes them idempotently to a key-value store.
//!
//! ## Collectors
//!
//! - **Generic**: stores an arbitrary `{id, data}` payload, tagged with a
//!   timestamp and the configured environment
//! - **News**: reads a Google News feed selected by category, location and
//!   section, and stores one record per article keyed by its URL
//!
//! ## Usage
//!
//! ```sh
//! echo '{"id": "abc", "data": {"k": "v"}}' | data_collector generic
//! data_collector --store redis news --event news_event.json
//! ```
//!
//! ## Architecture
//!
//! One invocation handles one event:
//! 1. **Configuration**: resolve flags/environment and construct the store
//! 2. **Event**: read the event JSON from a file or stdin
//! 3. **Collect**: run the selected collector against the injected store
//! 4. **Respond**: print the `{statusCode, body}` envelope to stdout

use clap::Parser;
use serde_json::Value;
use std::error::Error;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregators;
mod cli;
mod collectors;
mod envelope;
mod error;
mod models;
mod stores;
mod utils;

use aggregators::GoogleNews;
use cli::{Cli, Command};
use collectors::{GenericCollector, NewsCollector};
use stores::{MemoryStore, RedisStore, StoreBackend, StoreKind};
use utils::truncate_for_log;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let store = match args.store {
        StoreKind::Memory => StoreBackend::Memory(MemoryStore::new()),
        StoreKind::Redis => StoreBackend::Redis(RedisStore::connect(&args.redis_url, &args.table).await?),
    };
    info!(environment = %args.environment, table = %args.table, store = ?args.store, "Store ready");
    if args.discards_records() {
        warn!("Using the in-memory store without --dump; records will not outlive this run");
    }

    let event = read_event(args.command.event_path()).await?;

    let response = match &args.command {
        Command::Generic { .. } => {
            GenericCollector::new(&store, args.environment.as_str())
                .handle(event)
                .await
        }
        Command::News { .. } => {
            let aggregator = GoogleNews::new(&args.news_base_url)?;
            NewsCollector::new(aggregator, &store).handle(event).await
        }
    };

    println!("{}", serde_json::to_string(&response)?);

    if args.dump {
        dump_records(&store)?;
    }

    let message = response
        .body_json()
        .ok()
        .and_then(|body| body["message"].as_str().map(str::to_string))
        .unwrap_or_default();
    let elapsed = start_time.elapsed();
    info!(
        status = response.status_code,
        %message,
        millis = elapsed.as_millis() as u64,
        "Execution complete"
    );
    Ok(())
}

/// Read the event JSON from `path`, or from stdin when there is none.
#[instrument(level = "debug")]
async fn read_event(path: Option<&std::path::PathBuf>) -> Result<Value, Box<dyn Error>> {
    let text = match path {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            text
        }
    };
    debug!(event = %truncate_for_log(&text, 300), "Read event");

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Print every record held by the memory store, one JSON line each.
fn dump_records(store: &StoreBackend) -> Result<(), Box<dyn Error>> {
    let Some(memory) = store.as_memory() else {
        warn!("--dump only applies to the memory store");
        return Ok(());
    };
    if memory.is_empty()? {
        info!("Memory store holds no records");
        return Ok(());
    }
    info!(count = memory.len()?, "Dumping stored records");
    for id in memory.ids()? {
        if let Some(record) = memory.get(&id)? {
            println!("{record}");
        }
    }
    Ok(())
}
