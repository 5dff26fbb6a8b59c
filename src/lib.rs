//! Skitter: a multi-tenant crawl engine
//!
//! This crate implements a web crawler that drives many domains' crawls
//! concurrently on a shared worker pool, extracts page text for full-text
//! indexing, and tracks per-crawl progress in a persisted stat store.

pub mod config;
pub mod engine;
pub mod extract;
pub mod index;
pub mod intake;
pub mod stats;
pub mod storage;

use thiserror::Error;

/// Main error type for Skitter operations
#[derive(Debug, Error)]
pub enum SkitterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Index error: {0}")]
    Index(#[from] index::IndexError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Intake payload error: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Skitter operations
pub type Result<T> = std::result::Result<T, SkitterError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use engine::CrawlEngine;
pub use intake::{Admission, IntakeHandler};
pub use stats::{CrawlStatus, StatTracker};
