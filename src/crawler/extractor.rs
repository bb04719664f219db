//! Streaming page-metadata extractor
//!
//! Walks the token stream of a document as a small state machine:
//!
//! ```text
//! BeforeHead --<head>--> InHead --<title>--> AfterTitleStart --any--> InHead
//!                          |
//!                          +--</head>--> Done
//! ```
//!
//! Nothing outside the `head` section is ever looked at, no tree is built,
//! and running out of input in any state simply returns what was captured.

use crate::crawler::tokenizer::{Tag, Token, Tokenizer};

/// The four values extracted from a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub og_image: String,
}

/// A `meta` value the extractor collects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaField {
    Description,
    Keywords,
    OgImage,
}

/// Meta attribute registry: `(attribute key, attribute value, field)`
///
/// A `meta` tag carrying one of these pairs contributes its `content`
/// attribute to the field.
const META_ATTRIBUTES: &[(&str, &str, MetaField)] = &[
    ("name", "description", MetaField::Description),
    ("name", "keywords", MetaField::Keywords),
    ("property", "og:image", MetaField::OgImage),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    BeforeHead,
    InHead,
    AfterTitleStart,
    Done,
}

/// Extracts title, description, keywords and og:image from a document
///
/// # Example
///
/// ```
/// use metacrawl::crawler::extract_metadata;
///
/// let html = r#"<html><head><title>T</title><meta name="description" content="D"></head></html>"#;
/// let metadata = extract_metadata(html);
/// assert_eq!(metadata.title, "T");
/// assert_eq!(metadata.description, "D");
/// assert!(metadata.keywords.is_empty());
/// ```
pub fn extract_metadata(document: &str) -> PageMetadata {
    let mut extractor = Extractor::default();
    let mut state = ScanState::BeforeHead;

    for token in Tokenizer::new(document) {
        state = extractor.step(state, token);
        if state == ScanState::Done {
            break;
        }
    }

    extractor.metadata
}

#[derive(Debug, Default)]
struct Extractor {
    metadata: PageMetadata,
    title_found: bool,
}

impl Extractor {
    fn step(&mut self, state: ScanState, token: Token<'_>) -> ScanState {
        match state {
            ScanState::BeforeHead => match token {
                Token::StartTag(tag) if tag.is_named("head") => ScanState::InHead,
                _ => ScanState::BeforeHead,
            },
            ScanState::AfterTitleStart => match token {
                Token::Text(text) => {
                    self.capture_title(text);
                    ScanState::InHead
                }
                other => self.head_step(other),
            },
            ScanState::InHead => self.head_step(token),
            ScanState::Done => ScanState::Done,
        }
    }

    fn head_step(&mut self, token: Token<'_>) -> ScanState {
        match token {
            Token::StartTag(tag) if tag.is_named("title") => ScanState::AfterTitleStart,
            Token::StartTag(tag) if tag.is_named("meta") => {
                self.capture_meta(&tag);
                ScanState::InHead
            }
            token if token.is_end_tag("head") => ScanState::Done,
            _ => ScanState::InHead,
        }
    }

    /// The first non-blank title wins
    fn capture_title(&mut self, raw: &str) {
        if self.title_found {
            return;
        }

        let title = clean_value(raw);
        if !title.is_empty() {
            self.metadata.title = title;
            self.title_found = true;
        }
    }

    /// A later matching `meta` replaces an earlier one
    fn capture_meta(&mut self, tag: &Tag<'_>) {
        let Some(field) = registry_match(tag) else {
            return;
        };

        let content = tag
            .attribute("content")
            .map(|value| value.trim().to_string())
            .unwrap_or_default();

        match field {
            MetaField::Description => self.metadata.description = content,
            MetaField::Keywords => self.metadata.keywords = content,
            MetaField::OgImage => self.metadata.og_image = content,
        }
    }
}

/// Finds the first attribute of `tag` present in the registry
fn registry_match(tag: &Tag<'_>) -> Option<MetaField> {
    tag.attributes().find_map(|attr| {
        META_ATTRIBUTES
            .iter()
            .find(|(key, value, _)| attr.is_named(key) && attr.value.trim().eq_ignore_ascii_case(value))
            .map(|&(_, _, field)| field)
    })
}

/// Decodes character references and trims surrounding whitespace
fn clean_value(raw: &str) -> String {
    html_escape::decode_html_entities(raw).trim().to_string()
}
