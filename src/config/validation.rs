use crate::config::types::{Config, CrawlConfig, FetchConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on retries per page; anything higher hammers a failing site
const MAX_RETRIES: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates HTTP client configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("user-agent", &config.user_agent),
        ("accept-language", &config.accept_language),
        ("referer", &config.referer),
    ] {
        if !is_header_safe(value) {
            return Err(ConfigError::Validation(format!(
                "{} must contain only visible ASCII characters, got '{}'",
                name, value
            )));
        }
    }

    validate_seconds("delay-secs", config.delay_secs, true)?;
    validate_seconds("timeout-secs", config.timeout_secs, false)?;
    validate_seconds("connect-timeout-secs", config.connect_timeout_secs, false)?;
    validate_seconds("retry-backoff-secs", config.retry_backoff_secs, true)?;

    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= {}, got {}",
            MAX_RETRIES, config.max_retries
        )));
    }

    Ok(())
}

/// Validates crawl targets
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use HTTP or HTTPS",
            config.base_url
        )));
    }

    for seed in &config.seeds {
        let url = Url::parse(seed.trim())
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Seed URL '{}' must use HTTP or HTTPS",
                seed
            )));
        }
    }

    for code in &config.only_expansions {
        if code.trim().is_empty() {
            return Err(ConfigError::Validation(
                "expansion codes cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_seconds(name: &str, value: f64, allow_zero: bool) -> Result<(), ConfigError> {
    let valid = value.is_finite() && if allow_zero { value >= 0.0 } else { value > 0.0 };
    if !valid {
        let bound = if allow_zero { ">= 0" } else { "> 0" };
        return Err(ConfigError::Validation(format!(
            "{} must be a finite number {}, got {}",
            name, bound, value
        )));
    }
    Ok(())
}

fn is_header_safe(value: &str) -> bool {
    value.chars().all(|c| c == ' ' || c == '\t' || c.is_ascii_graphic())
}
