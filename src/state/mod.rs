//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TaskStatus`: the three-state lifecycle of a crawl task

mod task_status;

pub use task_status::TaskStatus;
