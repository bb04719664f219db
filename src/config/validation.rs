use crate::config::types::{Config, CrawlerConfig, ServerConfig};
use crate::ConfigError;
use std::net::SocketAddr;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_crawler_config(&config.crawler)?;
    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config
        .bind_address
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidAddress(format!("'{}': {}", config.bind_address, e)))?;

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.fetch_timeout == 0 {
        return Err(ConfigError::Validation(
            "fetch_timeout must be greater than 0ms".to_string(),
        ));
    }

    if config.domain_interval == 0 {
        return Err(ConfigError::Validation(
            "domain_interval must be greater than 0ms".to_string(),
        ));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 10_000 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 10000, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.max_body_bytes < 1024 {
        return Err(ConfigError::Validation(format!(
            "max_body_bytes must be >= 1024, got {}",
            config.max_body_bytes
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}
