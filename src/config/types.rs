use serde::Deserialize;

/// Main configuration structure for Skitter
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    pub index: IndexConfig,
    pub storage: StorageConfig,
}

/// Crawl engine configuration, fixed at construction
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Number of concurrent workers in the shared pool
    pub workers: u32,

    /// Maximum fetch admissions per domain per sliding second
    #[serde(rename = "max-rps")]
    pub max_rps: u32,

    /// Maximum link-hop distance from a root that will be fetched
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Page count a crawl must exceed before it can be marked Done
    #[serde(rename = "done-threshold", default = "default_done_threshold")]
    pub done_threshold: u64,

    /// Seconds before a finished crawl's record goes stale and a re-crawl
    /// request starts new work
    #[serde(rename = "recrawl-interval-secs", default = "default_recrawl_interval")]
    pub recrawl_interval_secs: i64,

    /// Per-fetch timeout in seconds
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// User agent string sent with every fetch
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Search index sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Base URL of the search engine
    pub endpoint: String,

    /// Logical collection extracted documents are written to
    pub collection: String,
}

/// Stat store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_done_threshold() -> u64 {
    10
}

fn default_recrawl_interval() -> i64 {
    86_399
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("skitter/{}", env!("CARGO_PKG_VERSION"))
}
