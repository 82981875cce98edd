//! URL handling module
//!
//! This module provides the `Address` value type that describes a single
//! fetch request, and the link filters that decide which discovered
//! addresses may enter the crawl.

mod address;
mod filter;

pub use address::{Address, Method, ResponseKind};
pub use filter::{accept_all, build_link_filter, host_of, matches_wildcard, LinkFilter};
