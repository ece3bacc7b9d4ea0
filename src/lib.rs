//! SVE-Cardlist: a polite card-list harvester
//!
//! This crate walks the Shadowverse EVOLVE card-list search results, follows
//! either classic numbered pagination or the infinite-scroll endpoint, extracts
//! one record per card and writes the deduplicated set to a TSV file.

pub mod card;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for card-list operations
#[derive(Debug, Error)]
pub enum CardlistError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Unrecognizable page structure for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Unsupported seed URL (expected a /cardlist/ page): {url}")]
    UnsupportedSeed { url: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No card records were produced ({})", no_records_reason(.all_seeds_failed))]
    NoRecords { all_seeds_failed: bool },
}

impl CardlistError {
    /// Returns true for failures worth another attempt after a backoff
    ///
    /// Timeouts, transport failures, HTTP 429 and HTTP 5xx are transient.
    /// Everything else (4xx, unrecognizable markup, local errors) is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

fn no_records_reason(all_seeds_failed: &bool) -> &'static str {
    if *all_seeds_failed {
        "every seed URL failed"
    } else {
        "all results were filtered out or empty"
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for card-list operations
pub type Result<T> = std::result::Result<T, CardlistError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use card::{CardField, CardRecord};
pub use config::Config;
pub use crawler::{CrawlFilter, CrawlOutcome, PaginationMode};
pub use state::{SearchTarget, TargetState};
