//! Output module for crawl results
//!
//! This module handles:
//! - The fixed result-row layout and its status sentinels
//! - The shared CSV buffer each task writes its rows into

mod buffer;
mod row;

pub use buffer::ResultBuffer;
pub use row::{ResultRow, RowStatus, HEADER};
