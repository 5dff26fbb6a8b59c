//! Skitter main entry point
//!
//! This is the command-line interface for the Skitter crawl engine.

use anyhow::Context;
use clap::Parser;
use skitter::config::load_config_with_hash;
use skitter::index::HttpIndexer;
use skitter::intake::{consume, IntakeHandler};
use skitter::stats::SharedStatStore;
use skitter::storage::open_store;
use skitter::CrawlEngine;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Skitter: a multi-tenant crawl engine
///
/// Skitter drains crawl requests from its intake stream, traverses each
/// requested site breadth-first on a shared worker pool, pushes extracted
/// text to a search index, and tracks per-crawl progress in a stat store.
#[derive(Parser, Debug)]
#[command(name = "skitter")]
#[command(version)]
#[command(about = "A multi-tenant crawl engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    let store = open_store(Path::new(&config.storage.database_path))
        .with_context(|| format!("failed to open {}", config.storage.database_path))?;
    let store: SharedStatStore = Arc::new(Mutex::new(store));

    let sink = Arc::new(HttpIndexer::new(&config.index).context("failed to build index client")?);

    let engine =
        CrawlEngine::new(config.engine.clone(), sink, store).context("failed to build engine")?;

    tracing::info!(
        "Starting {} workers (max {} rps/domain, depth {})",
        config.engine.workers,
        config.engine.max_rps,
        config.engine.max_depth
    );
    let workers = engine.spawn_workers();

    // Intake: one JSON payload per line on stdin stands in for the message
    // transport. Deliveries are handed to the admission policy in order.
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(read_intake_lines(tx));

    consume(IntakeHandler::new(engine), rx).await;

    // The intake stream is gone, but registered crawls keep draining until
    // the process is stopped.
    tracing::info!("Intake finished; active crawls continue until shutdown");
    for worker in workers {
        worker.await?;
    }

    Ok(())
}

/// Feeds stdin lines into the intake channel until EOF
async fn read_intake_lines(tx: mpsc::Sender<Vec<u8>>) {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                if tx.send(line.into_bytes()).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read intake line: {}", e);
                break;
            }
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("skitter=info,warn"),
            1 => EnvFilter::new("skitter=debug,info"),
            2 => EnvFilter::new("skitter=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
