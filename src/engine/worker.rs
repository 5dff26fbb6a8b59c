//! Worker loop
//!
//! Every worker in the pool runs the same loop: scan the registered roots,
//! take one pending item from each root that has work, and process it. A
//! worker never parks on a single root, so fast domains keep making progress
//! while rate-limited ones wait, and service across domains approximates
//! round-robin.
//!
//! Per-item failures resolve to an explicit skip outcome consumed here; they
//! are structurally incapable of terminating the loop.

use crate::engine::fetcher::{fetch_page, FetchOutcome};
use crate::engine::job::CrawlJob;
use crate::engine::CrawlEngine;
use crate::extract;
use crate::index::{Document, DocumentSink};
use std::sync::Arc;
use std::time::Duration;

/// Cooperative yield between scans of the active-root set
const SCAN_INTERVAL: Duration = Duration::from_millis(1);

/// What became of one frontier item
#[derive(Debug)]
enum ItemOutcome {
    /// Fetched, indexed, and expanded into the frontier
    Indexed,
    /// Dropped with a reason; traversal of the root continues
    Skipped(String),
}

/// Runs one worker until its task is aborted
pub(crate) async fn run_worker(engine: Arc<CrawlEngine>, worker_id: u32) {
    tracing::debug!("Worker {} started", worker_id);

    loop {
        tokio::time::sleep(SCAN_INTERVAL).await;

        for job in engine.active_jobs().await {
            let Some((url, depth)) = job.pop().await else {
                // Drained frontier: completion check instead of a fetch
                engine.tracker().on_frontier_drained(job.root());
                continue;
            };

            if depth == engine.config().max_depth {
                // Already counted for dedup, never fetched
                continue;
            }

            match process_item(&engine, &job, &url, depth).await {
                ItemOutcome::Indexed => {
                    tracing::debug!("Indexed {} (depth {})", url, depth);
                }
                ItemOutcome::Skipped(reason) => {
                    tracing::warn!("Skipping {}: {}", url, reason);
                }
            }
        }
    }
}

/// Processes one frontier item end to end
async fn process_item(
    engine: &CrawlEngine,
    job: &CrawlJob,
    url: &str,
    depth: u32,
) -> ItemOutcome {
    job.admit(engine.config().max_rps).await;

    let body = match fetch_page(engine.client(), url).await {
        FetchOutcome::Success { body } => body,
        FetchOutcome::HttpStatus { status_code } => {
            return ItemOutcome::Skipped(format!("HTTP {}", status_code));
        }
        FetchOutcome::Failed { error } => {
            return ItemOutcome::Skipped(error);
        }
    };

    let page = extract::extract(&body, job.root());

    let document = Document {
        url: url.to_string(),
        content: page.text,
    };
    if let Err(e) = engine.sink().index(&document).await {
        return ItemOutcome::Skipped(format!("index write failed: {}", e));
    }

    job.push_links(page.links, depth + 1).await;
    job.record_fetched().await;
    engine.tracker().on_page_fetched(job.root());

    ItemOutcome::Indexed
}
