//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl lifecycle:
//! - Fetching and expanding the seed before any worker exists
//! - Running a fixed pool of workers over the dispatch queue
//! - Admitting each discovered address at most once through the frontier
//! - Stopping the pool once the queue has been joined or the crawl is cancelled

use crate::config::Config;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::queue::DispatchQueue;
use crate::output::{CrawlSummary, StatsCollector};
use crate::page::Page;
use crate::state::{CrawlPhase, WorkerState};
use crate::url::{accept_all, build_link_filter, Address, LinkFilter};
use crate::{ConfigError, CrawlError, FetchError};
use chrono::Utc;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

/// Called once for every page fetched successfully, including the seed
pub type PageHook = Arc<dyn Fn(&Page) + Send + Sync>;

/// Called for every discovered address whose fetch failed
pub type ErrorHook = Arc<dyn Fn(&Address, &FetchError) + Send + Sync>;

/// Builder for a `Crawler`
///
/// Hooks and filters run concurrently on every worker; they must be pure or
/// synchronize internally.
pub struct CrawlerBuilder {
    fetcher: Arc<dyn Fetcher>,
    concurrency: usize,
    queue_capacity: Option<usize>,
    filter: LinkFilter,
    on_page: PageHook,
    on_error: ErrorHook,
    cancel: CancellationToken,
}

impl CrawlerBuilder {
    /// Number of concurrent workers (default 10)
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Maximum number of fetched pages waiting in the queue; `None` is unbounded
    ///
    /// A worker whose push is refused expands the page itself.
    pub fn queue_capacity(mut self, capacity: Option<usize>) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Admits only discovered addresses for which `filter` returns true
    pub fn filter<F>(self, filter: F) -> Self
    where
        F: Fn(&Address) -> bool + Send + Sync + 'static,
    {
        self.link_filter(Arc::new(filter))
    }

    pub fn link_filter(mut self, filter: LinkFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn on_page<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Page) + Send + Sync + 'static,
    {
        self.on_page = Arc::new(hook);
        self
    }

    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Address, &FetchError) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(hook);
        self
    }

    /// Lets the caller stop the crawl early by cancelling `token`
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn build(self) -> Result<Crawler, ConfigError> {
        if self.concurrency < 1 {
            return Err(ConfigError::Validation(
                "concurrency must be >= 1".to_string(),
            ));
        }
        if self.queue_capacity == Some(0) {
            return Err(ConfigError::Validation(
                "queue capacity must be >= 1 when set".to_string(),
            ));
        }

        let (phase, _) = watch::channel(CrawlPhase::Seeding);

        Ok(Crawler {
            fetcher: self.fetcher,
            concurrency: self.concurrency,
            queue_capacity: self.queue_capacity,
            filter: self.filter,
            on_page: self.on_page,
            on_error: self.on_error,
            cancel: self.cancel,
            phase,
        })
    }
}

/// Main crawler structure
///
/// A crawler can run several crawls one after another; each run gets its own
/// frontier and queue.
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    concurrency: usize,
    queue_capacity: Option<usize>,
    filter: LinkFilter,
    on_page: PageHook,
    on_error: ErrorHook,
    cancel: CancellationToken,
    phase: watch::Sender<CrawlPhase>,
}

impl Crawler {
    /// Starts building a crawler around a fetcher
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ripple_crawl::config::HttpConfig;
    /// use ripple_crawl::{Address, Crawler, HttpFetcher};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let fetcher = HttpFetcher::from_config(&HttpConfig::default())?;
    /// let crawler = Crawler::builder(fetcher)
    ///     .concurrency(4)
    ///     .filter(|address| !address.target().contains("logout"))
    ///     .on_page(|page| println!("{}", page))
    ///     .build()?;
    ///
    /// let summary = crawler.run(Address::new("https://example.com/")).await?;
    /// println!("Visited {} pages", summary.pages_visited);
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder<F: Fetcher + 'static>(fetcher: F) -> CrawlerBuilder {
        CrawlerBuilder {
            fetcher: Arc::new(fetcher),
            concurrency: crate::config::DEFAULT_CONCURRENCY,
            queue_capacity: None,
            filter: accept_all(),
            on_page: Arc::new(|_| {}),
            on_error: Arc::new(|address, error| {
                tracing::warn!("Failed to fetch {}: {}", address.target(), error);
            }),
            cancel: CancellationToken::new(),
        }
    }

    /// Starts building a crawler from configuration
    ///
    /// The HTTP client, worker count, queue capacity and link filter come from
    /// `config`; every visited page is logged at info level.
    pub fn from_config(config: &Config) -> crate::Result<CrawlerBuilder> {
        let fetcher = HttpFetcher::from_config(&config.http)?;

        Ok(Self::builder(fetcher)
            .concurrency(config.crawler.concurrency)
            .queue_capacity(config.crawler.queue_capacity)
            .link_filter(build_link_filter(&config.filter))
            .on_page(|page| {
                tracing::info!("Visited {} ({})", page.address().target(), page.kind());
            }))
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns a token that stops the crawl when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns the current lifecycle phase
    pub fn phase(&self) -> CrawlPhase {
        *self.phase.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<CrawlPhase> {
        self.phase.subscribe()
    }

    /// Runs one crawl from `seed`
    ///
    /// # Flow
    ///
    /// 1. Check, admit and fetch the seed; a failure here is fatal and no worker starts
    /// 2. Run the page hook on the seed and expand it
    /// 3. Spawn the workers and wait until the queue is joined (or cancelled)
    /// 4. Cancel the workers, wait for them to exit, return the summary
    ///
    /// Failed fetches of discovered links are reported through the error hook
    /// and never abort the crawl.
    pub async fn run(&self, seed: Address) -> crate::Result<CrawlSummary> {
        let started_at = Utc::now();
        let run_token = self.cancel.child_token();

        let shared = Arc::new(Shared {
            fetcher: Arc::clone(&self.fetcher),
            frontier: Frontier::new(),
            queue: DispatchQueue::new(self.queue_capacity),
            filter: Arc::clone(&self.filter),
            on_page: Arc::clone(&self.on_page),
            on_error: Arc::clone(&self.on_error),
            cancel: run_token.clone(),
            stats: StatsCollector::new(),
        });

        self.phase.send_replace(CrawlPhase::Seeding);
        tracing::info!("Starting crawl from {}", seed.target());

        if let Err(e) = seed.url() {
            tracing::error!("Seed {} is not fetchable: {}", seed.target(), e);
            self.set_phase(CrawlPhase::Stopped);
            return Err(e.into());
        }

        // A panic while seeding comes back as a JoinError
        let mut seeding = JoinSet::new();
        seeding.spawn(Worker::new(0, Arc::clone(&shared)).seed(seed.clone()));

        while let Some(result) = seeding.join_next().await {
            let failure = match result {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => {
                    tracing::error!("Seed {} could not be fetched: {}", seed.target(), e);
                    CrawlError::Seed(e)
                }
                Err(e) => {
                    tracing::error!("Seeding failed: {}", e);
                    CrawlError::Worker(e)
                }
            };
            self.set_phase(CrawlPhase::Stopped);
            return Err(failure);
        }

        self.set_phase(CrawlPhase::Running);
        let mut workers = JoinSet::new();
        for id in 1..=self.concurrency {
            workers.spawn(Worker::new(id, Arc::clone(&shared)).run());
        }
        tracing::info!(
            "Started {} workers with {} pages queued",
            self.concurrency,
            shared.queue.len()
        );

        let stop = tokio::select! {
            _ = shared.queue.join() => Stop::Drained,
            _ = run_token.cancelled() => Stop::Cancelled,
            Some(Err(e)) = workers.join_next() => Stop::WorkerFailed(e),
        };

        self.set_phase(CrawlPhase::Draining);
        run_token.cancel();

        let mut failure = match stop {
            Stop::Drained => {
                tracing::info!("Queue drained, stopping workers");
                None
            }
            Stop::Cancelled => {
                tracing::info!(
                    "Crawl cancelled with {} pages still pending",
                    shared.queue.pending()
                );
                None
            }
            Stop::WorkerFailed(e) => {
                tracing::error!("Worker failed: {}", e);
                Some(e)
            }
        };
        let cancelled = failure.is_none() && self.cancel.is_cancelled();

        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                match failure {
                    None => failure = Some(e),
                    Some(_) => tracing::error!("Worker failed: {}", e),
                }
            }
        }

        self.set_phase(CrawlPhase::Stopped);

        if let Some(e) = failure {
            return Err(CrawlError::Worker(e));
        }

        let summary =
            shared
                .stats
                .summarize(seed.target(), shared.frontier.snapshot(), cancelled, started_at);

        tracing::info!(
            "Crawl completed: {} pages visited, {} failed fetches in {}ms",
            summary.pages_visited,
            summary.fetch_failures,
            summary.elapsed().num_milliseconds()
        );

        Ok(summary)
    }

    fn set_phase(&self, next: CrawlPhase) {
        let current = self.phase();
        debug_assert!(
            current.can_transition_to(next),
            "invalid crawl phase transition {} -> {}",
            current,
            next
        );
        tracing::debug!("Crawl phase {} -> {}", current, next);
        self.phase.send_replace(next);
    }
}

/// Why the orchestrator stopped waiting on the pool
enum Stop {
    Drained,
    Cancelled,
    WorkerFailed(JoinError),
}

/// State shared by the orchestrator and every worker of one run
struct Shared {
    fetcher: Arc<dyn Fetcher>,
    frontier: Frontier,
    queue: DispatchQueue,
    filter: LinkFilter,
    on_page: PageHook,
    on_error: ErrorHook,
    cancel: CancellationToken,
    stats: StatsCollector,
}

/// One concurrent execution unit draining the queue
///
/// Worker 0 fetches and expands the seed before the pool starts.
struct Worker {
    id: usize,
    state: WorkerState,
    shared: Arc<Shared>,
}

impl Worker {
    fn new(id: usize, shared: Arc<Shared>) -> Self {
        Self {
            id,
            state: WorkerState::Idle,
            shared,
        }
    }

    /// Admits and fetches the seed, then expands it
    async fn seed(mut self, seed: Address) -> Result<(), FetchError> {
        self.shared.frontier.try_admit(&seed);
        let page = self.shared.fetcher.fetch(&seed).await?;
        self.expand(page).await;
        Ok(())
    }

    async fn run(mut self) {
        loop {
            let page = tokio::select! {
                biased;
                _ = self.shared.cancel.cancelled() => break,
                page = self.shared.queue.pop() => match page {
                    Some(page) => page,
                    None => break,
                },
            };

            self.expand(page).await;
            self.set_state(WorkerState::Idle);
            self.shared.queue.task_done();
        }

        self.set_state(WorkerState::Stopped);
    }

    /// Runs the page hook, then fetches every link that passes the filter and
    /// the frontier
    ///
    /// Fetched pages go onto the queue; if the queue is full they are expanded
    /// right here, depth first.
    fn expand(&mut self, page: Page) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.set_state(WorkerState::Expanding);
            tracing::debug!("Worker {} expanding {}", self.id, page);

            (self.shared.on_page)(&page);
            self.shared.stats.record_page();

            let links = page.links();
            drop(page);

            for address in links {
                if self.shared.cancel.is_cancelled() {
                    break;
                }
                if !(self.shared.filter)(&address) {
                    tracing::trace!("Filtered out {}", address.target());
                    continue;
                }
                if !self.shared.frontier.try_admit(&address) {
                    continue;
                }

                self.set_state(WorkerState::Fetching);
                let result = self.shared.fetcher.fetch(&address).await;
                self.set_state(WorkerState::Expanding);

                match result {
                    Ok(child) if self.shared.cancel.is_cancelled() => {
                        tracing::debug!(
                            "Discarding {} fetched after cancellation",
                            child.address().target()
                        );
                        self.shared.stats.record_discarded();
                        break;
                    }
                    Ok(child) => {
                        if let Err(child) = self.shared.queue.try_push(child) {
                            tracing::trace!(
                                "Queue full, worker {} expanding {} inline",
                                self.id,
                                child.address().target()
                            );
                            self.expand(child).await;
                        }
                    }
                    Err(e) => {
                        self.shared.stats.record_failure(&e);
                        (self.shared.on_error)(&address, &e);
                    }
                }
            }
        })
    }

    fn set_state(&mut self, next: WorkerState) {
        if self.state == next {
            return;
        }
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid worker transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!("Worker {} {} -> {}", self.id, self.state, next);
        self.state = next;
    }
}

/// Runs a complete crawl described by `config`
///
/// # Example
///
/// ```no_run
/// use ripple_crawl::config::load_config;
/// use ripple_crawl::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("crawl.toml"))?;
/// let summary = run_crawl(config).await?;
/// println!("{} pages", summary.pages_visited);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> crate::Result<CrawlSummary> {
    let crawler = Crawler::from_config(&config)?.build()?;
    crawler.run(Address::new(config.crawler.seed.as_str())).await
}
