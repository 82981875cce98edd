//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The `Fetcher` transport seam and its reqwest implementation
//! - HTML link extraction
//! - Frontier admission and the dispatch queue
//! - Overall crawl coordination over a fixed worker pool

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod queue;

pub use coordinator::{run_crawl, Crawler, CrawlerBuilder, ErrorHook, PageHook};
pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use frontier::Frontier;
pub use parser::{extract_links, resolve_link, select_hrefs};
pub use queue::DispatchQueue;
