//! SQLite stat store implementation
//!
//! This module provides a SQLite-based implementation of the StatStore trait.

use crate::stats::CrawlStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StatStore, StorageError, StorageResult};
use crate::storage::StatRecord;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite stat store backend
pub struct SqliteStatStore {
    conn: Connection,
}

impl SqliteStatStore {
    /// Opens (or creates) the stat database at the given path
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn record_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, i64, bool, String, u64)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get::<_, i64>(4)? != 0,
            row.get(5)?,
            row.get::<_, i64>(6)? as u64,
        ))
    }

    fn build_record(
        raw: (i64, String, String, i64, bool, String, u64),
    ) -> StorageResult<StatRecord> {
        let (id, domain, status, author_id, https, last_update, pages_count) = raw;

        let last_update = DateTime::parse_from_rfc3339(&last_update)
            .map_err(|_| StorageError::Timestamp(last_update.clone()))?
            .with_timezone(&Utc);

        Ok(StatRecord {
            id,
            domain,
            status: CrawlStatus::from_db_string(&status).unwrap_or(CrawlStatus::Crawling),
            author_id,
            https,
            last_update,
            pages_count,
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, domain, status, author_id, https, last_update, pages_count";

impl StatStore for SqliteStatStore {
    fn create_stat(
        &mut self,
        domain: &str,
        status: &CrawlStatus,
        author_id: i64,
        https: bool,
        last_update: DateTime<Utc>,
        pages_count: u64,
    ) -> StorageResult<i64> {
        self.conn
            .execute(
                "INSERT INTO stats (domain, status, author_id, https, last_update, pages_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    domain,
                    status.to_db_string(),
                    author_id,
                    https as i64,
                    last_update.to_rfc3339(),
                    pages_count as i64,
                ],
            )
            .map_err(constraint_aware)?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_progress(
        &mut self,
        id: i64,
        pages_count: u64,
        last_update: DateTime<Utc>,
    ) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE stats SET pages_count = ?1, last_update = ?2 WHERE id = ?3",
            params![pages_count as i64, last_update.to_rfc3339(), id],
        )?;

        if updated == 0 {
            return Err(StorageError::StatNotFound(id));
        }
        Ok(())
    }

    fn update_status(
        &mut self,
        id: i64,
        status: &CrawlStatus,
        last_update: DateTime<Utc>,
    ) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE stats SET status = ?1, last_update = ?2 WHERE id = ?3",
            params![status.to_db_string(), last_update.to_rfc3339(), id],
        )?;

        if updated == 0 {
            return Err(StorageError::StatNotFound(id));
        }
        Ok(())
    }

    fn get_stat(&self, id: i64) -> StorageResult<StatRecord> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {} FROM stats WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::record_from_row,
            )
            .optional()?
            .ok_or(StorageError::StatNotFound(id))?;

        Self::build_record(raw)
    }

    fn latest_for_domain(&self, domain: &str) -> StorageResult<Option<StatRecord>> {
        let raw = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM stats WHERE domain = ?1 ORDER BY id DESC LIMIT 1",
                    SELECT_COLUMNS
                ),
                params![domain],
                Self::record_from_row,
            )
            .optional()?;

        raw.map(Self::build_record).transpose()
    }

    fn stats_for_domain(&self, domain: &str) -> StorageResult<Vec<StatRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM stats WHERE domain = ?1 ORDER BY id ASC",
            SELECT_COLUMNS
        ))?;

        let rows = stmt.query_map(params![domain], Self::record_from_row)?;

        let mut records = Vec::new();
        for raw in rows {
            records.push(Self::build_record(raw?)?);
        }
        Ok(records)
    }
}

/// Maps SQLite constraint failures to the distinct error kind callers match on
fn constraint_aware(err: rusqlite::Error) -> StorageError {
    match &err {
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StorageError::ConstraintViolation(err.to_string())
        }
        _ => StorageError::Sqlite(err),
    }
}
