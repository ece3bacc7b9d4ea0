use serde::Deserialize;
use std::time::Duration;

/// Default browser identity; the site serves its regular markup to desktop browsers
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Default site root
pub const DEFAULT_BASE_URL: &str = "https://shadowverse-evolve.com";

/// Main configuration structure
///
/// Every section is optional in the TOML file; missing keys take the defaults
/// below. Command-line flags are applied on top of the loaded file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
}

/// HTTP client behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Accept-Language header
    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Referer header; empty to omit
    pub referer: String,

    /// Total time allowed for one request (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: f64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: f64,

    /// Minimum time between two outbound requests (seconds)
    #[serde(rename = "delay-secs")]
    pub delay_secs: f64,

    /// Extra attempts for a page after a transient failure
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base of the exponential backoff between attempts (seconds)
    #[serde(rename = "retry-backoff-secs")]
    pub retry_backoff_secs: f64,
}

/// What to crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Site root, used for expansion discovery and detail pages
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Search-result URLs to crawl; empty means "discover every expansion"
    pub seeds: Vec<String>,

    /// Expansion codes to keep; empty keeps everything
    #[serde(rename = "only-expansions")]
    pub only_expansions: Vec<String>,

    /// Maximum number of records to output; 0 means unlimited
    pub limit: usize,

    /// Fetch each card's detail page to fill missing fields
    pub details: bool,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the TSV file to write
    pub path: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "ja,en;q=0.9".to_string(),
            referer: format!("{}/cardlist/", DEFAULT_BASE_URL),
            timeout_secs: 15.0,
            connect_timeout_secs: 10.0,
            delay_secs: 0.6,
            max_retries: 2,
            retry_backoff_secs: 0.5,
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            seeds: Vec::new(),
            only_expansions: Vec::new(),
            limit: 0,
            details: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "cards.tsv".to_string(),
        }
    }
}

impl FetchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.connect_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.retry_backoff_secs)
    }
}

impl CrawlConfig {
    /// Returns the record limit, or None when unlimited
    pub fn limit(&self) -> Option<usize> {
        if self.limit == 0 {
            None
        } else {
            Some(self.limit)
        }
    }
}
