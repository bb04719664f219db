//! Restricted markup tokenizer
//!
//! A lazy, borrow-based tokenizer that yields just enough structure for the
//! metadata extractor: start tags (with lazily parsed attributes), end tags,
//! text, comments and doctypes. It does not build a tree, does not validate
//! nesting and never fails; an unterminated construct simply ends the stream.
//!
//! The content of raw-text elements (`script`, `style`, `title`, ...) is
//! returned as a single text token, so markup-looking strings inside them are
//! never mistaken for tags.

use std::borrow::Cow;

/// Elements whose content runs verbatim up to the matching end tag
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "title", "textarea", "xmp", "iframe", "noembed", "noframes",
];

/// A single markup token borrowed from the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// `<name attr=...>` or `<name ... />`
    StartTag(Tag<'a>),

    /// `</name>`; carries the raw tag name
    EndTag(&'a str),

    /// Character data between tags, undecoded
    Text(&'a str),

    /// `<!-- ... -->` and bogus comments such as `<? ... >`
    Comment(&'a str),

    /// `<!DOCTYPE ...>`
    Doctype(&'a str),
}

impl<'a> Token<'a> {
    /// Returns true if this is an end tag named `name` (ASCII case-insensitive)
    pub fn is_end_tag(&self, name: &str) -> bool {
        matches!(self, Token::EndTag(tag) if tag.eq_ignore_ascii_case(name))
    }
}

/// A start tag with its unparsed attribute source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    name: &'a str,
    attrs: &'a str,
    self_closing: bool,
}

impl<'a> Tag<'a> {
    /// The tag name as written in the source
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Returns true if the tag is named `name` (ASCII case-insensitive)
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Returns true for `<name ... />`
    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }

    /// Iterates the tag's attributes in source order
    pub fn attributes(&self) -> Attributes<'a> {
        Attributes {
            input: self.attrs,
            pos: 0,
        }
    }

    /// Value of the first attribute named `key`
    pub fn attribute(&self, key: &str) -> Option<Cow<'a, str>> {
        self.attributes()
            .find(|attr| attr.is_named(key))
            .map(|attr| attr.value)
    }
}

/// One `key="value"` pair of a start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub key: &'a str,

    /// Value with character references decoded; empty for bare attributes
    pub value: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    /// Returns true if the key is `name` (ASCII case-insensitive)
    pub fn is_named(&self, name: &str) -> bool {
        self.key.eq_ignore_ascii_case(name)
    }
}

/// Iterator over the attributes of a [`Tag`]
#[derive(Debug, Clone)]
pub struct Attributes<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Iterator for Attributes<'a> {
    type Item = Attribute<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.input.as_bytes();

        while self.pos < bytes.len()
            && (bytes[self.pos].is_ascii_whitespace() || bytes[self.pos] == b'/')
        {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return None;
        }

        let key_start = self.pos;
        // a leading '=' belongs to the key, per HTML attribute-name rules
        self.pos += 1;
        while self.pos < bytes.len()
            && !bytes[self.pos].is_ascii_whitespace()
            && !matches!(bytes[self.pos], b'=' | b'/')
        {
            self.pos += 1;
        }
        let key = &self.input[key_start..self.pos];

        let mut lookahead = self.pos;
        while lookahead < bytes.len() && bytes[lookahead].is_ascii_whitespace() {
            lookahead += 1;
        }
        if lookahead >= bytes.len() || bytes[lookahead] != b'=' {
            return Some(Attribute {
                key,
                value: Cow::Borrowed(""),
            });
        }

        self.pos = lookahead + 1;
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }

        let raw = match bytes.get(self.pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                let value_start = self.pos + 1;
                let value_end = self.input[value_start..]
                    .find(quote as char)
                    .map(|offset| value_start + offset)
                    .unwrap_or(bytes.len());
                self.pos = (value_end + 1).min(bytes.len());
                &self.input[value_start..value_end]
            }
            Some(_) => {
                let value_start = self.pos;
                while self.pos < bytes.len() && !bytes[self.pos].is_ascii_whitespace() {
                    self.pos += 1;
                }
                &self.input[value_start..self.pos]
            }
            None => "",
        };

        Some(Attribute {
            key,
            value: html_escape::decode_html_entities(raw),
        })
    }
}

/// Lazy tokenizer over a decoded document
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    /// Set after a raw-text start tag; the next token is its content
    raw_text_end: Option<&'static str>,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer positioned at the start of `input`
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_text_end: None,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Consumes everything up to the end tag of the current raw-text element
    fn next_raw_text(&mut self, element: &'static str) -> Option<Token<'a>> {
        let rest = self.rest();
        let end = find_end_tag(rest, element).unwrap_or(rest.len());
        self.pos += end;
        if end == 0 {
            self.next()
        } else {
            Some(Token::Text(&rest[..end]))
        }
    }

    fn next_text(&mut self) -> Token<'a> {
        let rest = self.rest();
        // the leading char is either text or a '<' that opens no tag
        let first = rest.chars().next().map_or(1, char::len_utf8);
        let end = rest[first..]
            .find('<')
            .map(|offset| offset + first)
            .unwrap_or(rest.len());
        self.pos += end;
        Token::Text(&rest[..end])
    }

    /// `<!...>`: comments, doctypes and CDATA-like bogus comments
    fn next_markup_declaration(&mut self) -> Option<Token<'a>> {
        let rest = self.rest();

        if let Some(body) = rest.strip_prefix("<!--") {
            let end = body.find("-->")?;
            self.pos += 4 + end + 3;
            return Some(Token::Comment(&body[..end]));
        }

        let end = rest.find('>')?;
        self.pos += end + 1;
        let body = &rest[2..end];
        match (body.get(..7), body.get(7..)) {
            (Some(keyword), Some(doctype)) if keyword.eq_ignore_ascii_case("doctype") => {
                Some(Token::Doctype(doctype.trim()))
            }
            _ => Some(Token::Comment(body)),
        }
    }

    fn next_end_tag(&mut self) -> Option<Token<'a>> {
        let rest = self.rest();
        let end = rest.find('>')?;
        self.pos += end + 1;

        let inner = &rest[2..end];
        if !inner.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Some(Token::Comment(inner));
        }
        let name_end = inner
            .find(|c: char| c.is_ascii_whitespace() || c == '/')
            .unwrap_or(inner.len());
        Some(Token::EndTag(&inner[..name_end]))
    }

    fn next_start_tag(&mut self) -> Option<Token<'a>> {
        let rest = self.rest();
        let end = find_tag_end(rest)?;
        self.pos += end + 1;

        let inner = &rest[1..end];
        let name_end = inner
            .find(|c: char| c.is_ascii_whitespace() || c == '/')
            .unwrap_or(inner.len());
        let name = &inner[..name_end];
        let attrs = &inner[name_end..];
        let self_closing = attrs.trim_end().ends_with('/');

        if !self_closing {
            self.raw_text_end = RAW_TEXT_ELEMENTS
                .iter()
                .find(|element| name.eq_ignore_ascii_case(element))
                .copied();
        }

        Some(Token::StartTag(Tag {
            name,
            attrs,
            self_closing,
        }))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(element) = self.raw_text_end.take() {
            return self.next_raw_text(element);
        }

        let rest = self.rest();
        let bytes = rest.as_bytes();
        if bytes.is_empty() {
            return None;
        }
        if bytes[0] != b'<' {
            return Some(self.next_text());
        }

        match bytes.get(1).copied() {
            Some(b'!') => self.next_markup_declaration(),
            Some(b'?') => {
                let end = rest.find('>')?;
                self.pos += end + 1;
                Some(Token::Comment(&rest[2..end]))
            }
            Some(b'/') => self.next_end_tag(),
            Some(c) if c.is_ascii_alphabetic() => self.next_start_tag(),
            _ => Some(self.next_text()),
        }
    }
}

/// Finds the `>` closing a start tag, skipping `>` inside quoted values
fn find_tag_end(tag: &str) -> Option<usize> {
    let bytes = tag.as_bytes();
    let mut quote: Option<u8> = None;
    let mut after_equals = false;

    for (i, &b) in bytes.iter().enumerate().skip(1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'>' => return Some(i),
                b'"' | b'\'' if after_equals => quote = Some(b),
                b'=' => {
                    after_equals = true;
                    continue;
                }
                _ if b.is_ascii_whitespace() && after_equals => continue,
                _ => {}
            },
        }
        after_equals = false;
    }

    None
}

/// Offset of `</element` (ASCII case-insensitive) followed by a tag boundary
fn find_end_tag(haystack: &str, element: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let name = element.as_bytes();
    let mut from = 0;

    while let Some(offset) = haystack[from..].find("</") {
        let start = from + offset;
        let name_start = start + 2;
        let name_end = name_start + name.len();
        if name_end <= bytes.len()
            && bytes[name_start..name_end].eq_ignore_ascii_case(name)
            && bytes
                .get(name_end)
                .map_or(true, |&b| b.is_ascii_whitespace() || matches!(b, b'>' | b'/'))
        {
            return Some(start);
        }
        from = name_start;
    }

    None
}
