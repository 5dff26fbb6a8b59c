//! Storage traits and error types
//!
//! This module defines the trait interface the stat store is accessed
//! through. The persistence backend is an external collaborator; nothing in
//! the engine touches it except via these create/update/read operations.

use crate::stats::CrawlStatus;
use crate::storage::StatRecord;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Stat record not found: {0}")]
    StatNotFound(i64),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid timestamp in store: {0}")]
    Timestamp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for stat store backends
///
/// One row per crawl attempt; `domain` is intentionally not unique across
/// rows. Implementations must be usable from multiple workers behind a lock.
pub trait StatStore: Send {
    /// Inserts a new stat record, returning its ID
    fn create_stat(
        &mut self,
        domain: &str,
        status: &CrawlStatus,
        author_id: i64,
        https: bool,
        last_update: DateTime<Utc>,
        pages_count: u64,
    ) -> StorageResult<i64>;

    /// Persists a progress checkpoint (pages_count, last_update)
    fn update_progress(
        &mut self,
        id: i64,
        pages_count: u64,
        last_update: DateTime<Utc>,
    ) -> StorageResult<()>;

    /// Persists a status transition (status, last_update)
    fn update_status(
        &mut self,
        id: i64,
        status: &CrawlStatus,
        last_update: DateTime<Utc>,
    ) -> StorageResult<()>;

    /// Gets a stat record by ID
    fn get_stat(&self, id: i64) -> StorageResult<StatRecord>;

    /// Gets the most recently created record for a domain, if any
    fn latest_for_domain(&self, domain: &str) -> StorageResult<Option<StatRecord>>;

    /// Gets every record for a domain, oldest first
    fn stats_for_domain(&self, domain: &str) -> StorageResult<Vec<StatRecord>>;
}
