//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `WorkerState`: what a single worker is doing (idle, fetching, expanding, stopped)
//! - `CrawlPhase`: where the whole crawl is in its lifecycle (seeding, running, draining, stopped)

mod crawl_phase;
mod worker_state;

pub use crawl_phase::CrawlPhase;
pub use worker_state::WorkerState;
