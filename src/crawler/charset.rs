//! Response body charset normalization
//!
//! The encoding is resolved in HTML sniffing order:
//!
//! 1. Byte-order mark
//! 2. `charset` parameter of the `Content-Type` header, when the label is known
//! 3. `<meta charset>` or `<meta http-equiv="content-type">` in the first
//!    1024 bytes
//! 4. UTF-8 if the bytes are valid UTF-8, otherwise windows-1252
//!
//! Malformed byte sequences are replaced with U+FFFD.

use crate::crawler::tokenizer::{Token, Tokenizer};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

/// Number of leading bytes scanned for an in-document charset declaration
const PRESCAN_BYTES: usize = 1024;

/// Decodes a response body to UTF-8 text
///
/// Never fails: a charset label nobody knows is ignored and the encoding is
/// sniffed from the body instead.
///
/// # Arguments
///
/// * `body` - The raw body bytes
/// * `content_type` - The `Content-Type` header value, if any
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = determine_encoding(body, content_type);
    let (text, actual, had_errors) = encoding.decode(body);

    if had_errors {
        tracing::debug!(
            "Body contained malformed {} sequences, replaced",
            actual.name()
        );
    }

    text.into_owned()
}

/// Resolves the encoding used to decode `body`
pub fn determine_encoding(body: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(body) {
        return encoding;
    }

    if let Some(label) = content_type.and_then(charset_param) {
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) => return encoding,
            None => tracing::debug!("Ignoring unknown charset label {:?}", label),
        }
    }

    if let Some(encoding) = prescan_meta(&body[..body.len().min(PRESCAN_BYTES)]) {
        return encoding;
    }

    if std::str::from_utf8(body).is_ok() {
        UTF_8
    } else {
        WINDOWS_1252
    }
}

/// Extracts the `charset` parameter from a `Content-Type` value
fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        (!value.is_empty()).then_some(value)
    })
}

/// Looks for a charset declared by a `meta` tag near the start of the document
fn prescan_meta(prefix: &[u8]) -> Option<&'static Encoding> {
    let text = String::from_utf8_lossy(prefix);

    for token in Tokenizer::new(&text) {
        let Token::StartTag(tag) = token else {
            continue;
        };
        if !tag.is_named("meta") {
            continue;
        }

        let mut http_equiv_content_type = false;
        let mut content = None;
        for attr in tag.attributes() {
            if attr.is_named("charset") {
                if let Some(encoding) = label_to_html_encoding(&attr.value) {
                    return Some(encoding);
                }
            } else if attr.is_named("http-equiv") {
                http_equiv_content_type = attr.value.trim().eq_ignore_ascii_case("content-type");
            } else if attr.is_named("content") {
                content = Some(attr.value.into_owned());
            }
        }

        if http_equiv_content_type {
            if let Some(encoding) = content
                .as_deref()
                .and_then(charset_from_meta_content)
                .and_then(label_to_html_encoding)
            {
                return Some(encoding);
            }
        }
    }

    None
}

/// Extracts the charset from a `meta` content value such as
/// `text/html; charset=iso-8859-1`
fn charset_from_meta_content(content: &str) -> Option<&str> {
    let start = content.to_ascii_lowercase().find("charset=")? + "charset=".len();
    let value = content[start..]
        .trim_start()
        .split(|c: char| c == ';' || c.is_whitespace())
        .next()?
        .trim_matches(|c| c == '"' || c == '\'');
    (!value.is_empty()).then_some(value)
}

/// Maps a declared label to an encoding, treating UTF-16 as UTF-8 the way
/// in-document declarations are interpreted by browsers
fn label_to_html_encoding(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).map(|encoding| encoding.output_encoding())
}
