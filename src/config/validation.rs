use crate::config::types::{Config, EngineConfig, IndexConfig, StorageConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    validate_index_config(&config.index)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates engine configuration
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 1000 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 1000, got {}",
            config.workers
        )));
    }

    if config.max_rps < 1 {
        return Err(ConfigError::Validation(format!(
            "max_rps must be >= 1, got {}",
            config.max_rps
        )));
    }

    if config.recrawl_interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "recrawl_interval_secs must be >= 1, got {}",
            config.recrawl_interval_secs
        )));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be >= 1, got {}",
            config.fetch_timeout_secs
        )));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates index sink configuration
fn validate_index_config(config: &IndexConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid index endpoint: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Index endpoint must be http or https, got '{}'",
            config.endpoint
        )));
    }

    if config.collection.is_empty() {
        return Err(ConfigError::Validation(
            "index collection cannot be empty".to_string(),
        ));
    }

    // Collection names end up in request paths, keep them path-safe
    if !config
        .collection
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "index collection must contain only alphanumeric characters, '-' or '_', got '{}'",
            config.collection
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
