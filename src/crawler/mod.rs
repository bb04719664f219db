//! Crawler module for page fetching and metadata extraction
//!
//! This module contains the core crawling logic, including:
//! - Per-domain request pacing
//! - HTTP fetching and charset normalization
//! - Tokenizing and scanning the head section of a page
//! - Crawl tasks that fan a batch of URLs out to workers

mod charset;
mod extractor;
mod fetcher;
mod limiter;
mod task;
mod tokenizer;

pub use charset::{decode_body, determine_encoding};
pub use extractor::{extract_metadata, PageMetadata};
pub use fetcher::{build_http_client, fetch_row, FetchOptions};
pub use limiter::{DomainLimiters, PermitSource};
pub use task::CrawlTask;
pub use tokenizer::{Attribute, Attributes, Tag, Token, Tokenizer};
