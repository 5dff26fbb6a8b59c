//! Stat tracking for crawl progress
//!
//! The tracker owns the lifecycle of each domain's persisted progress record:
//! created at job admission, checkpointed every tenth successful fetch, and
//! transitioned to Done once the frontier drains past the completion
//! threshold. It is the only component that writes stat rows for running
//! jobs; requesters observe crawl progress exclusively through those rows.

use crate::storage::{StatStore, StorageResult};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Shared handle to the stat store, lockable from any worker
pub type SharedStatStore = Arc<Mutex<dyn StatStore>>;

/// How many successful fetches between persisted progress checkpoints
const CHECKPOINT_EVERY: u64 = 10;

/// Status of one crawl attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlStatus {
    /// The crawl is registered and its frontier is being drained
    Crawling,
    /// The frontier drained after fetching more pages than the threshold
    Done,
    /// The request was rejected before any job was created
    Error(String),
}

impl CrawlStatus {
    pub fn to_db_string(&self) -> String {
        match self {
            Self::Crawling => "Crawling".to_string(),
            Self::Done => "Done".to_string(),
            Self::Error(reason) => format!("Error: {}", reason),
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "Crawling" => Some(Self::Crawling),
            "Done" => Some(Self::Done),
            other => other
                .strip_prefix("Error: ")
                .map(|reason| Self::Error(reason.to_string())),
        }
    }
}

/// In-memory handle to one root's persisted record
#[derive(Debug)]
struct StatHandle {
    record_id: i64,
    pages_count: u64,
    status: CrawlStatus,
}

/// Tracks and persists per-root crawl progress
///
/// All mutation goes through the narrow operations below so the handle map
/// stays consistent with the store. Checkpoint failures are logged, never
/// propagated into the worker loop; the next checkpoint writes the absolute
/// count, so a failed write delays visibility but loses nothing.
pub struct StatTracker {
    store: SharedStatStore,
    handles: Mutex<HashMap<String, StatHandle>>,
    done_threshold: u64,
}

impl StatTracker {
    pub fn new(store: SharedStatStore, done_threshold: u64) -> Self {
        Self {
            store,
            handles: Mutex::new(HashMap::new()),
            done_threshold,
        }
    }

    /// Creates the Crawling record for a newly admitted job
    ///
    /// A re-crawl of a stale domain replaces the previous in-memory handle;
    /// the old row stays in the store as history.
    pub fn on_job_start(&self, root: &str, author_id: i64, https: bool) -> StorageResult<()> {
        let record_id = {
            let mut store = self.store.lock().unwrap();
            store.create_stat(root, &CrawlStatus::Crawling, author_id, https, Utc::now(), 0)?
        };

        let mut handles = self.handles.lock().unwrap();
        handles.insert(
            root.to_string(),
            StatHandle {
                record_id,
                pages_count: 0,
                status: CrawlStatus::Crawling,
            },
        );

        Ok(())
    }

    /// Records one successful fetch, checkpointing every tenth
    ///
    /// Returns the new page count for the root, or None if the root is not
    /// tracked (its job was never registered here).
    pub fn on_page_fetched(&self, root: &str) -> Option<u64> {
        let mut handles = self.handles.lock().unwrap();
        let handle = handles.get_mut(root)?;

        handle.pages_count += 1;
        let count = handle.pages_count;

        if count % CHECKPOINT_EVERY == 0 {
            let result = {
                let mut store = self.store.lock().unwrap();
                store.update_progress(handle.record_id, count, Utc::now())
            };
            if let Err(e) = result {
                // Progress rows are the only visibility requesters have;
                // the next checkpoint carries the absolute count
                tracing::warn!("Stat checkpoint failed for {}: {}", root, e);
            }
        }

        Some(count)
    }

    /// Handles a drained frontier, transitioning Crawling -> Done at most once
    ///
    /// Returns true only on the call that performs the transition. A root
    /// whose entire site held fewer pages than the threshold stays Crawling
    /// forever under this policy.
    pub fn on_frontier_drained(&self, root: &str) -> bool {
        let mut handles = self.handles.lock().unwrap();
        let Some(handle) = handles.get_mut(root) else {
            return false;
        };

        if handle.status != CrawlStatus::Crawling || handle.pages_count <= self.done_threshold {
            return false;
        }

        let result = {
            let mut store = self.store.lock().unwrap();
            store.update_status(handle.record_id, &CrawlStatus::Done, Utc::now())
        };

        match result {
            Ok(()) => {
                handle.status = CrawlStatus::Done;
                tracing::info!("Crawl done: {} ({} pages)", root, handle.pages_count);
                true
            }
            Err(e) => {
                // Stay Crawling so the transition is retried next pass
                tracing::warn!("Failed to persist Done for {}: {}", root, e);
                false
            }
        }
    }

    /// In-memory page count for a tracked root
    pub fn pages_count(&self, root: &str) -> Option<u64> {
        let handles = self.handles.lock().unwrap();
        handles.get(root).map(|h| h.pages_count)
    }

    /// In-memory status for a tracked root
    pub fn status(&self, root: &str) -> Option<CrawlStatus> {
        let handles = self.handles.lock().unwrap();
        handles.get(root).map(|h| h.status.clone())
    }

    /// Shared store handle, for components that write their own records
    pub fn store(&self) -> SharedStatStore {
        Arc::clone(&self.store)
    }
}
