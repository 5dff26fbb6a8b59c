//! Per-root crawl job state
//!
//! One `CrawlJob` exists per actively-registered root. Its interior state
//! (frontier, rate window, fetch counter) is shared by every worker in the
//! pool, so all mutation is routed through the narrow operations below and
//! serialized by a per-job lock. Two workers racing the same root is an
//! intended case, not something callers need to prevent.

use crate::engine::frontier::Frontier;
use crate::engine::limiter::{RateWindow, ADMIT_POLL_INTERVAL};
use std::time::Instant;
use tokio::sync::Mutex;

/// Mutable per-job state behind the job lock
#[derive(Debug)]
struct JobState {
    frontier: Frontier,
    window: RateWindow,
    pages_fetched: u64,
}

/// Read-only view of a job's progress, for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSnapshot {
    pub pages_fetched: u64,
    pub frontier_len: usize,
    pub seen_count: usize,
}

/// One registered root's crawl, exclusively owned by the engine
#[derive(Debug)]
pub struct CrawlJob {
    root: String,
    https: bool,
    author_id: i64,
    state: Mutex<JobState>,
}

impl CrawlJob {
    /// Creates a job whose frontier is seeded with the root at depth 0
    pub fn new(root: &str, author_id: i64, https: bool) -> Self {
        Self {
            root: root.to_string(),
            https,
            author_id,
            state: Mutex::new(JobState {
                frontier: Frontier::seeded(root),
                window: RateWindow::new(),
                pages_fetched: 0,
            }),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn https(&self) -> bool {
        self.https
    }

    pub fn author_id(&self) -> i64 {
        self.author_id
    }

    /// Pops the next pending task, or None if the frontier is drained
    pub async fn pop(&self) -> Option<(String, u32)> {
        let mut state = self.state.lock().await;
        state.frontier.pop()
    }

    /// Pushes discovered links at the given depth, returning how many were new
    pub async fn push_links<I>(&self, links: I, depth: u32) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut state = self.state.lock().await;
        links
            .into_iter()
            .filter(|link| state.frontier.push(link.clone(), depth))
            .count()
    }

    /// Waits until the per-root rate window admits one fetch
    ///
    /// The lock is held only for the admission check itself, never across the
    /// poll sleep, so other workers can keep servicing this root meanwhile.
    pub async fn admit(&self, max_rps: u32) {
        loop {
            {
                let mut state = self.state.lock().await;
                if state.window.try_admit(max_rps, Instant::now()) {
                    return;
                }
            }
            tokio::time::sleep(ADMIT_POLL_INTERVAL).await;
        }
    }

    /// Counts one successful fetch, returning the new total
    pub async fn record_fetched(&self) -> u64 {
        let mut state = self.state.lock().await;
        state.pages_fetched += 1;
        state.pages_fetched
    }

    pub async fn snapshot(&self) -> JobSnapshot {
        let state = self.state.lock().await;
        JobSnapshot {
            pages_fetched: state.pages_fetched,
            frontier_len: state.frontier.len(),
            seen_count: state.frontier.seen_count(),
        }
    }
}
