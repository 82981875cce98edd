//! Link extraction from HTML pages
//!
//! Anchors are read in document order; that order drives the expansion
//! order of the crawl.

use crate::page::Page;
use crate::url::Address;
use scraper::{Html, Selector};
use std::sync::Arc;
use url::Url;

/// Extracts candidate addresses from a page
///
/// # Rules
///
/// - Only HTML pages yield links; every other kind returns an empty vector
/// - `<a>` elements without an `href` are skipped
/// - `javascript:` references are skipped
/// - Absolute references are kept verbatim, relative ones are resolved
///   against the page's own target
/// - Absolute references with a non-HTTP(S) scheme are dropped
///
/// Each address is a plain GET that records the page's target as its referer.
///
/// # Example
///
/// ```
/// use ripple_crawl::crawler::extract_links;
/// use ripple_crawl::{Address, Page, PageContent};
///
/// let page = Page::new(
///     Address::new("http://a/"),
///     PageContent::Text(r#"<a href="/b">B</a><a href="javascript:void(0)">x</a>"#.into()),
///     true,
/// );
/// let links = extract_links(&page);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].target(), "http://a/b");
/// ```
pub fn extract_links(page: &Page) -> Vec<Address> {
    let Some(document) = page.document() else {
        return Vec::new();
    };

    let base = match Url::parse(page.address().target()) {
        Ok(base) => Some(base),
        Err(e) => {
            tracing::debug!(
                "Page target {} is not a valid base URL: {}",
                page.address().target(),
                e
            );
            None
        }
    };

    let referer: Arc<str> = Arc::from(page.address().target());

    select_hrefs(&document)
        .into_iter()
        .filter_map(|href| resolve_link(&href, base.as_ref()))
        .map(|target| Address::new(target).with_referer(Arc::clone(&referer)))
        .collect()
}

/// Collects the `href` attribute of every anchor, in document order
pub fn select_hrefs(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Resolves an `href` to an absolute target
///
/// Returns None for `javascript:` references, non-HTTP(S) absolute
/// references, and relative references that cannot be resolved (including
/// any relative reference when there is no base).
pub fn resolve_link(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();

    if has_scheme(href, "javascript") {
        return None;
    }

    match Url::parse(href) {
        Ok(absolute) => {
            if absolute.scheme() == "http" || absolute.scheme() == "https" {
                Some(href.to_string())
            } else {
                None
            }
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            base?.join(href).ok().map(|url| url.to_string())
        }
        Err(_) => None,
    }
}

fn has_scheme(href: &str, scheme: &str) -> bool {
    href.len() > scheme.len()
        && href.as_bytes()[scheme.len()] == b':'
        && href[..scheme.len()].eq_ignore_ascii_case(scheme)
}
