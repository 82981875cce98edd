//! Output module for crawl statistics
//!
//! This module handles:
//! - Counting visited pages and failed fetches while a crawl runs
//! - Producing the `CrawlSummary` returned by a finished crawl
//! - Printing that summary for the command line

pub mod stats;

pub use stats::{print_summary, CrawlSummary, StatsCollector};
