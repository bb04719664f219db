use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Metacrawl
///
/// Every key has a default, so an empty file (or no file at all) yields a
/// working configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
}

/// HTTP gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the gateway listens on
    #[serde(rename = "bind-address", default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Timeout applied to connect, TLS handshake and the full round trip (milliseconds)
    #[serde(rename = "fetch-timeout", default = "default_fetch_timeout")]
    pub fetch_timeout: u64,

    /// Minimum time between two requests to the same domain (milliseconds)
    #[serde(rename = "domain-interval", default = "default_domain_interval")]
    pub domain_interval: u64,

    /// Maximum number of fetches a single task runs at once
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: u32,

    /// Upper bound on the bytes read from a response body
    #[serde(rename = "max-body-bytes", default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Drop rows whose body cannot be read instead of recording them with
    /// empty metadata
    #[serde(rename = "drop-undecodable-rows", default)]
    pub drop_undecodable_rows: bool,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl CrawlerConfig {
    /// Fetch timeout as a [`Duration`]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout)
    }

    /// Per-domain pacing interval as a [`Duration`]
    pub fn domain_interval(&self) -> Duration {
        Duration::from_millis(self.domain_interval)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: default_fetch_timeout(),
            domain_interval: default_domain_interval(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            max_body_bytes: default_max_body_bytes(),
            drop_undecodable_rows: false,
            user_agent: default_user_agent(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_fetch_timeout() -> u64 {
    5000
}

fn default_domain_interval() -> u64 {
    1000
}

fn default_max_concurrent_fetches() -> u32 {
    64
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_user_agent() -> String {
    format!("metacrawl/{}", env!("CARGO_PKG_VERSION"))
}
