//! Ripple-Crawl main entry point
//!
//! This is the command-line interface for the Ripple-Crawl traversal engine.

use clap::Parser;
use ripple_crawl::config::{load_config_with_hash, validate, Config};
use ripple_crawl::output::print_summary;
use ripple_crawl::{Address, CrawlSummary, Crawler};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ripple-Crawl: a concurrent web traversal engine
///
/// Ripple-Crawl fetches a seed page, follows every link it finds with a fixed
/// pool of workers and prints a summary once the reachable set is exhausted.
#[derive(Parser, Debug)]
#[command(name = "ripple-crawl")]
#[command(version)]
#[command(about = "A concurrent web traversal engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (optional when --seed is given)
    #[arg(value_name = "CONFIG", required_unless_present = "seed")]
    config: Option<PathBuf>,

    /// Seed address, overrides the configuration file
    #[arg(long)]
    seed: Option<String>,

    /// Number of concurrent workers, overrides the configuration file
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Skip targets containing this substring (repeatable)
    #[arg(long, value_name = "SUBSTRING")]
    exclude: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let summary = handle_crawl(config).await?;

    if !cli.quiet {
        print_summary(&summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_crawl=info,warn"),
            1 => EnvFilter::new("ripple_crawl=debug,info"),
            2 => EnvFilter::new("ripple_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, if any, and applies command-line overrides
fn resolve_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match (&cli.config, &cli.seed) {
        (Some(path), _) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        (None, Some(seed)) => Config::for_seed(seed.as_str()),
        (None, None) => return Err("either a configuration file or --seed is required".into()),
    };

    if let Some(seed) = &cli.seed {
        config.crawler.seed = seed.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    config.filter.exclude.extend(cli.exclude.iter().cloned());

    validate(&config)?;
    Ok(config)
}

/// Handles the main crawl operation
///
/// Ctrl-C cancels the crawl; pages already fetched are still summarized.
async fn handle_crawl(config: Config) -> Result<CrawlSummary, Box<dyn std::error::Error>> {
    tracing::info!(
        "Seed: {}, workers: {}, queue capacity: {}",
        config.crawler.seed,
        config.crawler.concurrency,
        config
            .crawler
            .queue_capacity
            .map_or_else(|| "unbounded".to_string(), |c| c.to_string())
    );

    let crawler = Crawler::from_config(&config)?.build()?;

    let token = crawler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            token.cancel();
        }
    });

    match crawler.run(Address::new(config.crawler.seed.as_str())).await {
        Ok(summary) => {
            tracing::info!("Crawl completed successfully");
            Ok(summary)
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
