//! Crawl engine: job registry, worker pool, and per-root crawl state
//!
//! This module contains the core crawling machinery:
//! - Per-root frontier queues with enqueue-time dedup
//! - Per-root sliding-window rate limiting
//! - The shared worker pool that drives every registered crawl
//! - HTTP fetching with explicit per-item outcomes
//!
//! The engine context is constructed once and handed to every component;
//! there is no ambient global state.

mod fetcher;
mod frontier;
mod job;
mod limiter;
mod worker;

pub use fetcher::{build_http_client, fetch_page, FetchOutcome};
pub use frontier::Frontier;
pub use job::{CrawlJob, JobSnapshot};
pub use limiter::RateWindow;

use crate::config::EngineConfig;
use crate::index::DocumentSink;
use crate::stats::{SharedStatStore, StatTracker};
use crate::storage::StorageResult;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Shared engine context
///
/// Owns the active-job registry, the HTTP client, the indexer sink and the
/// stat tracker. Jobs are registered by the intake handler and drained by the
/// worker pool; a registered job runs until its frontier is exhausted, or
/// indefinitely if it never is. There is no mid-flight cancellation; a stale
/// re-crawl admission replaces a root's registry entry with a fresh job.
pub struct CrawlEngine {
    config: EngineConfig,
    client: Client,
    sink: Arc<dyn DocumentSink>,
    tracker: StatTracker,
    jobs: RwLock<HashMap<String, Arc<CrawlJob>>>,
}

impl CrawlEngine {
    /// Builds the engine context
    pub fn new(
        config: EngineConfig,
        sink: Arc<dyn DocumentSink>,
        store: SharedStatStore,
    ) -> Result<Arc<Self>, reqwest::Error> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.fetch_timeout_secs),
        )?;
        let tracker = StatTracker::new(store, config.done_threshold);

        Ok(Arc::new(Self {
            config,
            client,
            sink,
            tracker,
            jobs: RwLock::new(HashMap::new()),
        }))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn sink(&self) -> &dyn DocumentSink {
        self.sink.as_ref()
    }

    pub fn tracker(&self) -> &StatTracker {
        &self.tracker
    }

    /// Registers a new crawl job for a root
    ///
    /// The Crawling stat record is created first so that a storage failure
    /// admits nothing. Registering a root that already has an entry replaces
    /// it (stale re-crawl); workers holding the old job finish their in-hand
    /// items against it and then stop seeing it.
    pub async fn register_job(
        &self,
        root: &str,
        author_id: i64,
        https: bool,
    ) -> StorageResult<Arc<CrawlJob>> {
        self.tracker.on_job_start(root, author_id, https)?;

        let job = Arc::new(CrawlJob::new(root, author_id, https));
        let mut jobs = self.jobs.write().await;
        jobs.insert(root.to_string(), Arc::clone(&job));

        tracing::info!("Registered crawl job for {} (author {})", root, author_id);
        Ok(job)
    }

    /// Snapshot of the currently registered jobs
    pub async fn active_jobs(&self) -> Vec<Arc<CrawlJob>> {
        let jobs = self.jobs.read().await;
        jobs.values().cloned().collect()
    }

    /// Looks up the registered job for a root
    pub async fn job(&self, root: &str) -> Option<Arc<CrawlJob>> {
        let jobs = self.jobs.read().await;
        jobs.get(root).cloned()
    }

    pub async fn is_registered(&self, root: &str) -> bool {
        let jobs = self.jobs.read().await;
        jobs.contains_key(root)
    }

    /// Spawns the fixed-size worker pool
    ///
    /// Workers run until aborted; the engine has no shutdown of its own.
    pub fn spawn_workers(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        (0..self.config.workers)
            .map(|worker_id| {
                let engine = Arc::clone(self);
                tokio::spawn(worker::run_worker(engine, worker_id))
            })
            .collect()
    }
}
