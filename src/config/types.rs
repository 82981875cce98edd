use serde::Deserialize;

/// Default number of concurrent workers
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Crawl engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Address the crawl starts from
    pub seed: String,

    /// Number of concurrent workers
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Maximum number of fetched pages waiting for expansion (unbounded if unset)
    #[serde(rename = "queue-capacity", default)]
    pub queue_capacity: Option<usize>,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds; no timeout when unset
    #[serde(rename = "timeout-secs", default)]
    pub timeout_secs: Option<u64>,

    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: None,
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Link filter configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    /// Host patterns (e.g., "example.com" or "*.example.com"); empty allows any host
    #[serde(default)]
    pub domains: Vec<String>,

    /// Substrings that reject a target when present
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Config {
    /// Builds a configuration for a seed with every other setting defaulted
    pub fn for_seed(seed: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig {
                seed: seed.into(),
                concurrency: DEFAULT_CONCURRENCY,
                queue_capacity: None,
            },
            http: HttpConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_user_agent() -> String {
    format!("ripple-crawl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_connect_timeout() -> u64 {
    10
}
