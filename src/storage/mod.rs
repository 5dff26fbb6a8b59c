//! Storage module for persisted crawl progress
//!
//! This module handles the stat store: the one external table requesters poll
//! to observe crawl progress. It covers:
//! - SQLite database initialization and schema management
//! - Stat record create/update/read operations behind the StatStore trait

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStatStore;
pub use traits::{StatStore, StorageError, StorageResult};

use crate::stats::CrawlStatus;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Opens (or creates) a stat store database
pub fn open_store(path: &Path) -> StorageResult<SqliteStatStore> {
    SqliteStatStore::new(path)
}

/// One persisted row per crawl attempt
///
/// Multiple rows may share `domain` with different `author_id`s: the intake
/// policy records interest from a second requester without starting a second
/// concurrent job.
#[derive(Debug, Clone)]
pub struct StatRecord {
    pub id: i64,
    pub domain: String,
    pub status: CrawlStatus,
    pub author_id: i64,
    pub https: bool,
    pub last_update: DateTime<Utc>,
    pub pages_count: u64,
}

impl StatRecord {
    /// Whether this record is still fresh under the given re-crawl interval
    pub fn is_fresh(&self, recrawl_interval: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.last_update + recrawl_interval > now
    }
}
