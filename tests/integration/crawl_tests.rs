//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use ripple_crawl::config::{Config, HttpConfig};
use ripple_crawl::crawler::run_crawl;
use ripple_crawl::{Address, CrawlError, CrawlPhase, Crawler, HttpFetcher};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An HTML response with the given body
fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html")
}

/// Mounts a GET mock for `route` that must be hit exactly `times` times
async fn mount_page(server: &MockServer, route: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

fn crawler() -> Crawler {
    let fetcher = HttpFetcher::from_config(&HttpConfig::default()).expect("client");
    Crawler::builder(fetcher)
        .concurrency(4)
        .build()
        .expect("crawler")
}

#[tokio::test]
async fn test_relative_absolute_and_javascript_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(format!(
            r#"<html><body>
            <a href="/b">Relative</a>
            <a href="{}/c">Absolute</a>
            <a href="javascript:void(0)">Script</a>
            </body></html>"#,
            base
        )),
        1,
    )
    .await;
    mount_page(&server, "/b", html("<p>b</p>"), 1).await;
    mount_page(&server, "/c", html("<p>c</p>"), 1).await;

    let summary = crawler()
        .run(Address::new(format!("{}/", base)))
        .await
        .expect("crawl should succeed");

    let mut expected = vec![
        format!("{}/", base),
        format!("{}/b", base),
        format!("{}/c", base),
    ];
    expected.sort();

    assert_eq!(summary.admitted, expected);
    assert_eq!(summary.pages_visited, 3);
    assert_eq!(summary.fetch_failures, 0);
    assert!(!summary.cancelled);
}

#[tokio::test]
async fn test_same_target_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(format!(r#"<a href="/b">one</a><a href="{}/b">two</a>"#, base)),
        1,
    )
    .await;
    // Links back to the seed must not refetch it either
    mount_page(&server, "/b", html(r#"<a href="/">home</a>"#), 1).await;

    let summary = crawler()
        .run(Address::new(format!("{}/", base)))
        .await
        .expect("crawl should succeed");

    assert_eq!(summary.pages_visited, 2);
}

#[tokio::test]
async fn test_missing_link_does_not_abort_crawl() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html(r#"<a href="/missing">gone</a><a href="/other">other</a>"#),
        1,
    )
    .await;
    mount_page(
        &server,
        "/missing",
        ResponseTemplate::new(404).set_body_string("Not Found"),
        1,
    )
    .await;
    mount_page(&server, "/other", html(r#"<a href="/deeper">deeper</a>"#), 1).await;
    mount_page(&server, "/deeper", html("<p>end</p>"), 1).await;

    let failed = Arc::new(Mutex::new(Vec::new()));
    let fetcher = HttpFetcher::from_config(&HttpConfig::default()).unwrap();
    let crawler = Crawler::builder(fetcher)
        .on_error({
            let failed = Arc::clone(&failed);
            move |address, error| {
                failed
                    .lock()
                    .unwrap()
                    .push((address.target().to_string(), error.to_string()));
            }
        })
        .build()
        .unwrap();

    let summary = crawler
        .run(Address::new(format!("{}/", server.uri())))
        .await
        .expect("a failing link must not fail the crawl");

    assert_eq!(summary.pages_visited, 3);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(summary.failures_by_kind.get("404"), Some(&1));

    let failed = failed.lock().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, format!("{}/missing", server.uri()));
    assert_eq!(failed[0].1, "404: \"Not Found\"");
}

#[tokio::test]
async fn test_seed_failure_starts_no_workers() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        ResponseTemplate::new(500).set_body_string("Internal Server Error"),
        1,
    )
    .await;

    let visited = Arc::new(Mutex::new(0usize));
    let fetcher = HttpFetcher::from_config(&HttpConfig::default()).unwrap();
    let crawler = Crawler::builder(fetcher)
        .on_page({
            let visited = Arc::clone(&visited);
            move |_| *visited.lock().unwrap() += 1
        })
        .build()
        .unwrap();

    let result = crawler.run(Address::new(format!("{}/", server.uri()))).await;

    match result {
        Err(CrawlError::Seed(e)) => {
            assert_eq!(e.status(), Some(500));
            assert!(e.to_string().starts_with("500: "));
        }
        other => panic!("expected seed failure, got {:?}", other.map(|s| s.admitted)),
    }

    assert_eq!(*visited.lock().unwrap(), 0);
    assert_eq!(crawler.phase(), CrawlPhase::Stopped);

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_filter_rejects_logout() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(r#"<a href="/logout">Log out</a><a href="/profile">Profile</a>"#),
        1,
    )
    .await;
    mount_page(&server, "/logout", html("bye"), 0).await;
    mount_page(&server, "/profile", html("me"), 1).await;

    let fetcher = HttpFetcher::from_config(&HttpConfig::default()).unwrap();
    let crawler = Crawler::builder(fetcher)
        .filter(|address| !address.target().contains("logout"))
        .build()
        .unwrap();

    let summary = crawler
        .run(Address::new(format!("{}/", base)))
        .await
        .unwrap();

    assert_eq!(
        summary.admitted,
        vec![format!("{}/", base), format!("{}/profile", base)]
    );
}

#[tokio::test]
async fn test_links_carry_referer() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", html(r#"<a href="/b">b</a>"#), 1).await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .and(header("referer", seed.as_str()))
        .respond_with(html("b"))
        .expect(1)
        .mount(&server)
        .await;

    let summary = crawler().run(Address::new(seed)).await.unwrap();
    assert_eq!(summary.fetch_failures, 0);
}

#[tokio::test]
async fn test_non_html_pages_are_not_expanded() {
    let server = MockServer::start().await;

    mount_page(&server, "/", html(r#"<a href="/notes.txt">notes</a>"#), 1).await;
    mount_page(
        &server,
        "/notes.txt",
        ResponseTemplate::new(200).set_body_raw(r#"<a href="/hidden">hidden</a>"#, "text/plain"),
        1,
    )
    .await;
    mount_page(&server, "/hidden", html("hidden"), 0).await;

    let summary = crawler()
        .run(Address::new(format!("{}/", server.uri())))
        .await
        .unwrap();

    assert_eq!(summary.pages_visited, 2);
}

#[tokio::test]
async fn test_bounded_queue_crawls_whole_site() {
    let server = MockServer::start().await;

    let index: String = (0..10)
        .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", html(index.clone()), 1).await;
    for i in 0..10 {
        mount_page(&server, &format!("/p{}", i), html(index.clone()), 1).await;
    }

    let fetcher = HttpFetcher::from_config(&HttpConfig::default()).unwrap();
    let crawler = Crawler::builder(fetcher)
        .concurrency(2)
        .queue_capacity(Some(1))
        .build()
        .unwrap();

    let summary = crawler
        .run(Address::new(format!("{}/", server.uri())))
        .await
        .unwrap();

    assert_eq!(summary.pages_visited, 11);
    assert_eq!(summary.admitted.len(), 11);
}

#[tokio::test]
async fn test_run_crawl_from_config() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html(r#"<a href="/account/logout">out</a><a href="/docs">docs</a>"#),
        1,
    )
    .await;
    mount_page(&server, "/account/logout", html("bye"), 0).await;
    mount_page(&server, "/docs", html("docs"), 1).await;

    let mut config = Config::for_seed(format!("{}/", server.uri()));
    config.crawler.concurrency = 2;
    config.filter.exclude = vec!["logout".to_string()];

    let summary = run_crawl(config).await.expect("crawl should succeed");

    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.seed, format!("{}/", server.uri()));
}

#[tokio::test]
async fn test_domain_allow_list_keeps_crawl_on_site() {
    let server = MockServer::start().await;

    mount_page(&server, "/", html(r#"<a href="/b">b</a>"#), 1).await;
    mount_page(&server, "/b", html("b"), 0).await;

    // The mock server lives on 127.0.0.1, so every discovered link is off-site.
    // The seed itself is never filtered.
    let mut config = Config::for_seed(format!("{}/", server.uri()));
    config.filter.domains = vec!["example.com".to_string()];

    let summary = run_crawl(config).await.unwrap();

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.admitted, vec![format!("{}/", server.uri())]);
}
