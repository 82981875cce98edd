//! Link filters built from configuration

use crate::config::FilterConfig;
use crate::url::Address;
use std::sync::Arc;
use url::Url;

/// Predicate deciding whether a discovered address may be admitted
///
/// Filters run concurrently on every worker, so they must be pure or
/// synchronize internally.
pub type LinkFilter = Arc<dyn Fn(&Address) -> bool + Send + Sync>;

/// Returns a filter that accepts every address
pub fn accept_all() -> LinkFilter {
    Arc::new(|_| true)
}

/// Builds a filter from the `[filter]` configuration section
///
/// An address passes when its host matches one of `domains` (or `domains`
/// is empty) and its target contains none of the `exclude` substrings.
pub fn build_link_filter(config: &FilterConfig) -> LinkFilter {
    if config.domains.is_empty() && config.exclude.is_empty() {
        return accept_all();
    }

    let domains = config.domains.clone();
    let exclude = config.exclude.clone();

    Arc::new(move |address: &Address| {
        let target = address.target();
        if exclude.iter().any(|needle| target.contains(needle.as_str())) {
            return false;
        }
        if domains.is_empty() {
            return true;
        }
        match host_of(target) {
            Some(host) => domains.iter().any(|pattern| matches_wildcard(pattern, &host)),
            None => false,
        }
    })
}

/// Extracts the lowercase host of a target, if it parses
pub fn host_of(target: &str) -> Option<String> {
    Url::parse(target)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.to_lowercase()))
}

/// Checks if a host matches a wildcard pattern
///
/// `"example.com"` matches only itself; `"*.example.com"` matches the bare
/// domain and any subdomain of it.
///
/// ```
/// use ripple_crawl::url::matches_wildcard;
///
/// assert!(matches_wildcard("*.example.com", "blog.example.com"));
/// assert!(matches_wildcard("*.example.com", "example.com"));
/// assert!(!matches_wildcard("*.example.com", "myexample.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}
