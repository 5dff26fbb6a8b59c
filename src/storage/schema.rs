//! Database schema definitions
//!
//! This module contains the SQL schema for the stat store.

/// SQL schema for the stat store
///
/// Note: `domain` carries no uniqueness constraint. Multiple rows may share a
/// domain with different authors — the intake policy relies on this to record
/// interest in an in-progress crawl without starting duplicate work.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS stats (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain VARCHAR(255) NOT NULL,
    status VARCHAR(64) NOT NULL,
    author_id INTEGER NOT NULL,
    https INTEGER NOT NULL DEFAULT 0,
    last_update TEXT NOT NULL,
    pages_count INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_stats_domain ON stats(domain);
CREATE INDEX IF NOT EXISTS idx_stats_author ON stats(author_id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
