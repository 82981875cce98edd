//! Address: the immutable descriptor of one fetch request

use crate::UrlError;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use url::Url;

/// HTTP method used to fetch an address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the response body should be decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// Decode as text using the response charset
    #[default]
    Text,
    /// Keep the raw bytes
    Binary,
    /// Parse as JSON
    Json,
}

/// A traversal request descriptor
///
/// Two addresses are equal when their targets are equal; the method,
/// parameters and hints are not part of the identity. The frontier relies on
/// this, so a GET and a POST to the same target are fetched only once.
#[derive(Debug, Clone)]
pub struct Address {
    method: Method,
    target: String,
    query: Option<BTreeMap<String, String>>,
    body: Option<BTreeMap<String, String>>,
    response_kind: ResponseKind,
    /// Target of the page this address was discovered on
    referer: Option<Arc<str>>,
}

impl Address {
    /// Creates a GET address for `target` that expects a text response
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            target: target.into(),
            query: None,
            body: None,
            response_kind: ResponseKind::Text,
            referer: None,
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the query string parameters
    pub fn with_query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = Some(query);
        self
    }

    /// Sets the form body parameters
    pub fn with_body(mut self, body: BTreeMap<String, String>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_response_kind(mut self, kind: ResponseKind) -> Self {
        self.response_kind = kind;
        self
    }

    /// Records the target of the page this address was discovered on
    ///
    /// Only the target is kept, so a discovered address never holds on to
    /// the chain of pages that led to it.
    pub fn with_referer(mut self, referer: impl Into<Arc<str>>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn query(&self) -> Option<&BTreeMap<String, String>> {
        self.query.as_ref()
    }

    pub fn body(&self) -> Option<&BTreeMap<String, String>> {
        self.body.as_ref()
    }

    pub fn response_kind(&self) -> ResponseKind {
        self.response_kind
    }

    pub fn referer(&self) -> Option<&str> {
        self.referer.as_deref()
    }

    /// Parses the target as an absolute, fetchable URL
    ///
    /// Only `http` and `https` targets with a host are accepted.
    pub fn url(&self) -> Result<Url, UrlError> {
        let url = Url::parse(&self.target)
            .map_err(|e| UrlError::Parse(format!("{}: {}", self.target, e)))?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(UrlError::InvalidScheme(other.to_string())),
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(UrlError::MissingDomain);
        }

        Ok(url)
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {}>", self.method, self.target)
    }
}
