use crate::config::types::{Config, CrawlerConfig, FilterConfig, HttpConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the worker pool size
const MAX_CONCURRENCY: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_filter_config(&config.filter)?;
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let seed = Url::parse(&config.seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed '{}': {}", config.seed, e)))?;

    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed '{}' must use HTTP or HTTPS",
            config.seed
        )));
    }

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.queue_capacity == Some(0) {
        return Err(ConfigError::Validation(
            "queue-capacity must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1 when set".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    for pattern in &config.domains {
        validate_domain_pattern(pattern)?;
    }

    if config.exclude.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::Validation(
            "exclude entries cannot be empty (they would reject every link)".to_string(),
        ));
    }

    Ok(())
}

/// Validates a host pattern: non-empty, at most one leading `*.`, no scheme or path
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    let bare = pattern.strip_prefix("*.").unwrap_or(pattern);

    if bare.is_empty() || bare.contains('*') {
        return Err(ConfigError::InvalidPattern(format!(
            "'{}' must be a host or '*.' followed by a host",
            pattern
        )));
    }

    if bare.contains("://") || bare.contains('/') {
        return Err(ConfigError::InvalidPattern(format!(
            "'{}' must not contain a scheme or path",
            pattern
        )));
    }

    if bare != bare.to_lowercase() {
        return Err(ConfigError::InvalidPattern(format!(
            "'{}' must be lowercase",
            pattern
        )));
    }

    Ok(())
}
