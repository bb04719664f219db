//! Configuration module for Metacrawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use metacrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("metacrawl.toml")).unwrap();
//! println!("Domains are paced at one request per {}ms", config.crawler.domain_interval);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, ServerConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
