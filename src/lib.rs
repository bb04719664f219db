//! Metacrawl: batch page-metadata crawler
//!
//! This crate accepts batches of URLs, fetches them concurrently under
//! per-domain pacing, extracts the page title and a handful of `meta` values
//! from each response, and renders the results as CSV.

pub mod config;
pub mod crawler;
pub mod gateway;
pub mod output;
pub mod service;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Metacrawl operations
#[derive(Debug, Error)]
pub enum MetacrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Submission contains no URLs")]
    EmptySubmission,

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::TaskStatus,
        to: state::TaskStatus,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
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

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Errors raised while collecting a response body for decoding
///
/// Unknown charset labels are not errors; the encoding is sniffed instead.
#[derive(Debug, Error)]
pub enum CharsetError {
    #[error("Failed to read body: {0}")]
    Read(String),
}

/// Result type alias for Metacrawl operations
pub type Result<T> = std::result::Result<T, MetacrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::CrawlTask;
pub use output::{ResultRow, RowStatus};
pub use service::{MetaCrawl, QueryOutcome};
pub use state::TaskStatus;
pub use crate::url::{extract_domain, validate_url};
