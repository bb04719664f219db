use crate::crawler::PageMetadata;
use std::fmt;

/// Column titles of the result table, in output order
pub const HEADER: [&str; 6] = [
    "HTTP Status Code",
    "URL",
    "Page Title",
    "Meta Description",
    "Meta Keywords",
    "Og:image",
];

/// Outcome recorded in the status column of a result row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    /// A response was received with this HTTP status code
    Http(u16),

    /// The submitted string is not a fetchable URL (`-1`)
    InvalidUrl,

    /// Connecting, the TLS handshake, or the round trip failed (`0`)
    TransportFailure,
}

impl RowStatus {
    /// Value written to the status column
    pub fn as_field(&self) -> String {
        match self {
            Self::Http(code) => code.to_string(),
            Self::InvalidUrl => "-1".to_string(),
            Self::TransportFailure => "0".to_string(),
        }
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_field())
    }
}

/// One record of the output table, describing the outcome for one input URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub status: RowStatus,

    /// The URL exactly as it was submitted
    pub url: String,

    pub metadata: PageMetadata,
}

impl ResultRow {
    /// Row for a page that was fetched and scanned
    pub fn fetched(status_code: u16, url: impl Into<String>, metadata: PageMetadata) -> Self {
        Self {
            status: RowStatus::Http(status_code),
            url: url.into(),
            metadata,
        }
    }

    /// Row for a string that failed URL validation
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self {
            status: RowStatus::InvalidUrl,
            url: url.into(),
            metadata: PageMetadata::default(),
        }
    }

    /// Row for a fetch that never produced a response
    pub fn transport_failure(url: impl Into<String>) -> Self {
        Self {
            status: RowStatus::TransportFailure,
            url: url.into(),
            metadata: PageMetadata::default(),
        }
    }

    /// The row's fields in [`HEADER`] order
    pub fn fields(&self) -> [String; 6] {
        [
            self.status.as_field(),
            self.url.clone(),
            self.metadata.title.clone(),
            self.metadata.description.clone(),
            self.metadata.keywords.clone(),
            self.metadata.og_image.clone(),
        ]
    }
}
