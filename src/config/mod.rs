//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use ripple_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawling {} with {} workers", config.crawler.seed, config.crawler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, FilterConfig, HttpConfig, DEFAULT_CONCURRENCY};

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
