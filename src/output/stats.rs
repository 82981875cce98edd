//! Crawl statistics
//!
//! Workers record into a shared `StatsCollector`; the orchestrator turns it
//! into a `CrawlSummary` once the pool has stopped.

use crate::FetchError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Summary of one finished crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// Seed target the crawl started from
    pub seed: String,

    /// Pages fetched successfully and expanded (including the seed)
    pub pages_visited: usize,

    /// Pages fetched after cancellation and thrown away
    pub pages_discarded: usize,

    /// Discovered links whose fetch failed
    pub fetch_failures: usize,

    /// Failures keyed by status code, or "transport" / "decode"
    pub failures_by_kind: BTreeMap<String, usize>,

    /// Every target admitted by the frontier, sorted
    pub admitted: Vec<String>,

    /// True if the crawl was stopped before the queue drained
    pub cancelled: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlSummary {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Share of admitted targets that were fetched successfully, in percent
    pub fn success_rate(&self) -> f64 {
        if self.admitted.is_empty() {
            0.0
        } else {
            (self.pages_visited as f64 / self.admitted.len() as f64) * 100.0
        }
    }
}

/// Thread-safe counters filled in by workers
#[derive(Debug, Default)]
pub struct StatsCollector {
    pages_visited: AtomicUsize,
    pages_discarded: AtomicUsize,
    failures: Mutex<BTreeMap<String, usize>>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&self) {
        self.pages_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded(&self) {
        self.pages_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, error: &FetchError) {
        let key = match error {
            FetchError::Status { status, .. } => status.to_string(),
            FetchError::Transport { .. } => "transport".to_string(),
            FetchError::Decode { .. } => "decode".to_string(),
        };
        let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        *failures.entry(key).or_insert(0) += 1;
    }

    pub fn pages_visited(&self) -> usize {
        self.pages_visited.load(Ordering::Relaxed)
    }

    /// Builds the summary for a finished crawl
    pub fn summarize(
        &self,
        seed: &str,
        admitted: Vec<String>,
        cancelled: bool,
        started_at: DateTime<Utc>,
    ) -> CrawlSummary {
        let failures_by_kind = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        CrawlSummary {
            seed: seed.to_string(),
            pages_visited: self.pages_visited.load(Ordering::Relaxed),
            pages_discarded: self.pages_discarded.load(Ordering::Relaxed),
            fetch_failures: failures_by_kind.values().sum(),
            failures_by_kind,
            admitted,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Seed: {}", summary.seed);
    println!("  Addresses admitted: {}", summary.admitted.len());
    println!("  Pages visited: {}", summary.pages_visited);
    println!("  Failed fetches: {}", summary.fetch_failures);
    if summary.pages_discarded > 0 {
        println!("  Discarded after cancellation: {}", summary.pages_discarded);
    }
    println!(
        "  Elapsed: {:.2}s",
        summary.elapsed().num_milliseconds() as f64 / 1000.0
    );
    println!();

    if !summary.failures_by_kind.is_empty() {
        println!("Failures:");
        let mut counts: Vec<_> = summary.failures_by_kind.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));
        for (kind, count) in counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    if summary.cancelled {
        println!("Crawl was cancelled before the queue drained.");
    }

    println!(
        "Success Rate: {:.1}% ({} / {} admitted addresses fetched)",
        summary.success_rate(),
        summary.pages_visited,
        summary.admitted.len()
    );
}
