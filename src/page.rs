//! Fetched resources
//!
//! A `Page` is built exactly once per successful fetch. Its content is
//! classified into one of four kinds; HTML pages additionally expose a parsed
//! document for link extraction.

use crate::crawler::extract_links;
use crate::url::Address;
use bytes::Bytes;
use scraper::Html;
use std::borrow::Cow;
use std::fmt;

/// Decoded response body
#[derive(Debug, Clone)]
pub enum PageContent {
    Bytes(Bytes),
    Text(String),
    Json(serde_json::Value),
}

/// Classification of a fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Bytes,
    Text,
    Html,
    Json,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bytes => "BYTES",
            Self::Text => "TEXT",
            Self::Html => "HTML",
            Self::Json => "JSON",
        };
        f.write_str(s)
    }
}

/// The typed result of one successful fetch
#[derive(Debug, Clone)]
pub struct Page {
    address: Address,
    content: PageContent,
    kind: PageKind,
    content_type: Option<String>,
}

impl Page {
    /// Builds a page from decoded content
    ///
    /// `is_html` is the markup determination made from the response headers.
    /// JSON content is never treated as markup.
    pub fn new(address: Address, content: PageContent, is_html: bool) -> Self {
        let kind = match (&content, is_html) {
            (PageContent::Json(_), _) => PageKind::Json,
            (_, true) => PageKind::Html,
            (PageContent::Bytes(_), false) => PageKind::Bytes,
            (PageContent::Text(_), false) => PageKind::Text,
        };

        Self {
            address,
            content,
            kind,
            content_type: None,
        }
    }

    /// Records the raw Content-Type header the page was served with
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn content(&self) -> &PageContent {
        &self.content
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns true if the page is an HTML document
    pub fn is_html(&self) -> bool {
        self.kind == PageKind::Html
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            PageContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.content {
            PageContent::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn json(&self) -> Option<&serde_json::Value> {
        match &self.content {
            PageContent::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the markup source of an HTML page
    ///
    /// Binary bodies are decoded as UTF-8, replacing invalid sequences.
    pub fn markup(&self) -> Option<Cow<'_, str>> {
        if !self.is_html() {
            return None;
        }
        match &self.content {
            PageContent::Text(text) => Some(Cow::Borrowed(text.as_str())),
            PageContent::Bytes(bytes) => Some(String::from_utf8_lossy(bytes)),
            PageContent::Json(_) => None,
        }
    }

    /// Parses the page into an HTML document
    ///
    /// The document is parsed on each call and owned by the caller. Parsing
    /// never fails: malformed markup yields a best-effort tree.
    pub fn document(&self) -> Option<Html> {
        self.markup().map(|markup| Html::parse_document(&markup))
    }

    /// Extracts candidate addresses from the page in document order
    pub fn links(&self) -> Vec<Address> {
        extract_links(self)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Page: {} {}>", self.kind, self.address.target())
    }
}

/// Returns true if a Content-Type header denotes an HTML document
///
/// Only the media type is compared, so parameters such as `charset` are
/// ignored.
///
/// ```
/// use ripple_crawl::page::is_html_content_type;
///
/// assert!(is_html_content_type("text/html"));
/// assert!(is_html_content_type("text/html; charset=utf-8"));
/// assert!(!is_html_content_type("application/json"));
/// ```
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|media_type| media_type.trim().eq_ignore_ascii_case("text/html"))
        .unwrap_or(false)
}
