//! HTTP fetch worker
//!
//! Turns one submitted URL string into exactly one [`ResultRow`] (or, when
//! the drop policy is enabled, possibly none):
//! - Syntactic validation, without touching the network
//! - Waiting for the domain's pacing permit
//! - The request itself, bounded by the task's timeout
//! - Reading the head window of the body and normalizing its charset
//! - Metadata extraction

use crate::config::CrawlerConfig;
use crate::crawler::charset::decode_body;
use crate::crawler::extractor::{extract_metadata, PageMetadata};
use crate::crawler::limiter::DomainLimiters;
use crate::crawler::tokenizer::Tokenizer;
use crate::output::ResultRow;
use crate::url::{extract_domain, validate_url};
use crate::CharsetError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::time::Duration;

/// End tag that closes the head window
const HEAD_END: &[u8] = b"</head";

/// Per-task fetch settings, captured when the task is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Bound on connect, handshake and the whole round trip
    pub timeout: Duration,

    /// Upper bound on the bytes read from a body
    pub max_body_bytes: usize,

    /// Skip rows whose body cannot be read
    pub drop_undecodable_rows: bool,
}

impl FetchOptions {
    /// Snapshots the fetch settings from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            timeout: config.fetch_timeout(),
            max_body_bytes: config.max_body_bytes,
            drop_undecodable_rows: config.drop_undecodable_rows,
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Builds the HTTP client shared by every task of a service
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use metacrawl::config::CrawlerConfig;
/// use metacrawl::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.fetch_timeout())
        .connect_timeout(config.fetch_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one submitted URL and builds its result row
///
/// # Outcomes
///
/// | Condition | Row |
/// |-----------|-----|
/// | URL fails validation | `-1`, metadata empty |
/// | Connect, TLS or timeout failure | `0`, metadata empty |
/// | Body read fails | HTTP status, metadata empty, or no row when dropping |
/// | Otherwise | HTTP status and the extracted metadata |
///
/// The URL column always carries `raw_url` as given.
pub async fn fetch_row(
    client: &Client,
    limiters: &DomainLimiters,
    raw_url: &str,
    options: &FetchOptions,
) -> Option<ResultRow> {
    let url = match validate_url(raw_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Rejecting {:?}: {}", raw_url, e);
            return Some(ResultRow::invalid_url(raw_url));
        }
    };

    // validate_url rejects URLs without a host
    let Some(domain) = extract_domain(&url) else {
        return Some(ResultRow::invalid_url(raw_url));
    };

    limiters.acquire(&domain).await;
    tracing::debug!("Fetching {}", url);

    let response = match client
        .get(url.as_str())
        .timeout(options.timeout)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            if e.is_timeout() {
                tracing::warn!("Timed out fetching {}", url);
            } else {
                tracing::warn!("Failed to fetch {}: {}", url, e);
            }
            return Some(ResultRow::transport_failure(raw_url));
        }
    };

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let decoded = read_head_window(response, options.max_body_bytes)
        .await
        .map(|window| decode_body(&window, content_type.as_deref()));

    match decoded {
        Ok(text) => Some(ResultRow::fetched(status, raw_url, extract_metadata(&text))),
        Err(e) if options.drop_undecodable_rows => {
            tracing::warn!("Dropping row for {}: {}", url, e);
            None
        }
        Err(e) => {
            tracing::warn!("Could not read body of {}: {}", url, e);
            Some(ResultRow::fetched(status, raw_url, PageMetadata::default()))
        }
    }
}

/// Reads the body until the head section has closed or `max_bytes` is reached
async fn read_head_window(mut response: Response, max_bytes: usize) -> Result<Vec<u8>, CharsetError> {
    let mut window = Vec::new();
    let mut end_tag_seen = false;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| CharsetError::Read(e.to_string()))?
    {
        // an end tag may straddle two chunks
        let search_from = window.len().saturating_sub(HEAD_END.len() - 1);
        window.extend_from_slice(&chunk);

        end_tag_seen = end_tag_seen || contains_head_end(&window[search_from..]);
        if end_tag_seen && head_closed(&window) {
            break;
        }
        if window.len() >= max_bytes {
            window.truncate(max_bytes);
            break;
        }
    }

    Ok(window)
}

/// Returns true if `bytes` contains `</head` in any ASCII case
fn contains_head_end(bytes: &[u8]) -> bool {
    bytes
        .windows(HEAD_END.len())
        .any(|candidate| candidate.eq_ignore_ascii_case(HEAD_END))
}

/// Returns true once `</head>` appears outside scripts, styles and comments
fn head_closed(window: &[u8]) -> bool {
    Tokenizer::new(&String::from_utf8_lossy(window)).any(|token| token.is_end_tag("head"))
}
