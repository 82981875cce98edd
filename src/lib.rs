//! Ripple-Crawl: a concurrent web traversal engine
//!
//! This crate fetches a seed address, extracts outbound links from HTML
//! responses and keeps fetching newly discovered addresses with a bounded
//! pool of workers until the reachable set, narrowed by a caller-supplied
//! filter, is exhausted.

pub mod config;
pub mod crawler;
pub mod output;
pub mod page;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The seed could not be fetched, so there is nothing to traverse
    #[error("Seed fetch failed: {0}")]
    Seed(FetchError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    /// A worker task panicked (usually inside a caller hook)
    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Failure of a single fetch
///
/// A fetch error only ever terminates the branch of the traversal it
/// belongs to, unless it happened on the seed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS or timeout failure below the HTTP layer
    #[error("Transport failure for {url}: {message}")]
    Transport { url: String, message: String },

    /// The server answered with anything other than 200
    #[error("{status}: {body:?}")]
    Status {
        url: String,
        status: u16,
        /// Best-effort decoded body, truncated
        body: String,
    },

    /// A 200 response whose body did not match the requested response kind
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    /// Returns the HTTP status code, or `None` for transport-level failures
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Decode { .. } => Some(200),
            Self::Transport { .. } => None,
        }
    }

    /// Returns the target that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::Decode { url, .. } => {
                url
            }
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Crawler, CrawlerBuilder, Fetcher, Frontier, HttpFetcher};
pub use output::CrawlSummary;
pub use page::{Page, PageContent, PageKind};
pub use state::{CrawlPhase, WorkerState};
pub use url::{Address, Method, ResponseKind};
