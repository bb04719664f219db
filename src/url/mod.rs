//! URL handling module for Metacrawl
//!
//! This module provides submitted-URL validation and extraction of the
//! domain key used for per-domain pacing.

mod domain;
mod validate;

// Re-export main functions
pub use domain::extract_domain;
pub use validate::validate_url;
