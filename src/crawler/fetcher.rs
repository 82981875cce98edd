//! HTTP fetcher implementation
//!
//! This module turns an `Address` into a `Page`:
//! - Building HTTP clients with the configured user agent and timeouts
//! - Issuing exactly one request per address (no retry)
//! - Decoding the body according to the address's response kind
//! - Classifying failures into transport and status errors

use crate::config::HttpConfig;
use crate::page::{is_html_content_type, Page, PageContent};
use crate::url::{Address, ResponseKind};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE, REFERER};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

/// Maximum number of characters of an error body kept in a `FetchError`
const ERROR_BODY_LIMIT: usize = 200;

/// The transport seam used by the crawl engine
///
/// Implementations must be shareable across workers. A fetch succeeds only
/// on status 200.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, address: &Address) -> Result<Page, FetchError>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, address: &Address) -> Result<Page, FetchError> {
        (**self).fetch(address).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use ripple_crawl::config::HttpConfig;
/// use ripple_crawl::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true);

    if let Some(timeout) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(timeout));
    }

    builder.build()
}

/// `Fetcher` backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches an address
    ///
    /// # Request Flow
    ///
    /// 1. Send the request with the address method, query, form body and referer
    /// 2. Any status other than 200 → `FetchError::Status` with a truncated body
    /// 3. Decode the body as text, bytes or JSON per the response kind
    /// 4. Mark the page as HTML when the Content-Type media type is `text/html`
    async fn fetch(&self, address: &Address) -> Result<Page, FetchError> {
        let url = address.target();
        let mut request = self.client.request(address.method().into(), url);

        if let Some(query) = address.query() {
            request = request.query(query);
        }
        if let Some(body) = address.body() {
            request = request.form(body);
        }
        if let Some(referer) = address.referer() {
            request = request.header(REFERER, referer);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        let content_type = content_type_of(response.headers());

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("{} answered {}", url, status);
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate(&body, ERROR_BODY_LIMIT),
            });
        }

        let content = match address.response_kind() {
            ResponseKind::Text => PageContent::Text(
                response
                    .text()
                    .await
                    .map_err(|e| transport_error(url, &e))?,
            ),
            ResponseKind::Binary => PageContent::Bytes(
                response
                    .bytes()
                    .await
                    .map_err(|e| transport_error(url, &e))?,
            ),
            ResponseKind::Json => {
                let raw = response
                    .bytes()
                    .await
                    .map_err(|e| transport_error(url, &e))?;
                let value = serde_json::from_slice(&raw).map_err(|e| FetchError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
                PageContent::Json(value)
            }
        };

        let is_html = content_type.as_deref().is_some_and(is_html_content_type);
        let page = Page::new(address.clone(), content, is_html);
        Ok(match content_type {
            Some(content_type) => page.with_content_type(content_type),
            None => page,
        })
    }
}

/// Returns the Content-Type header, if present and readable
fn content_type_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn transport_error(url: &str, error: &reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    };

    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}

/// Truncates to at most `limit` characters without splitting a character
fn truncate(body: &str, limit: usize) -> String {
    match body.char_indices().nth(limit) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
