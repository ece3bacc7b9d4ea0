//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients with a browser-like identity
//! - Pacing requests through the run-wide throttle
//! - Error classification (transport, timeout, HTTP status)
//!
//! Retries are not performed here; the coordinator decides what to retry.

use crate::config::FetchConfig;
use crate::crawler::throttle::Throttle;
use crate::{CardlistError, ConfigError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Client;
use std::time::Duration;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Builds an HTTP client with proper configuration
///
/// The client sends the configured User-Agent, Accept-Language and Referer
/// on every request and transparently decodes gzip/brotli bodies.
///
/// # Example
///
/// ```no_run
/// use sve_cardlist::config::FetchConfig;
/// use sve_cardlist::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("accept-language", &config.accept_language)?,
    );
    if !config.referer.trim().is_empty() {
        headers.insert(REFERER, header_value("referer", &config.referer)?);
    }

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value.trim()).map_err(|e| {
        CardlistError::Config(ConfigError::Validation(format!(
            "invalid {} header value '{}': {}",
            name, value, e
        )))
    })
}

/// Rate-limited page fetcher
///
/// Owns the HTTP client and the run-wide throttle; every call to `fetch`
/// waits out the configured delay before sending.
pub struct Fetcher {
    client: Client,
    throttle: Throttle,
}

impl Fetcher {
    /// Creates a fetcher from the `[fetch]` configuration
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            throttle: Throttle::new(config.delay()),
        })
    }

    /// Replaces the minimum delay between requests
    pub fn set_min_delay(&mut self, delay: Duration) {
        self.throttle.min_delay = delay;
    }

    /// Fetches a page and returns its decoded body
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | No response within the timeout | `Timeout` |
    /// | DNS, connection, TLS or body read failure | `Network` |
    /// | Non-2xx status | `HttpStatus` |
    pub async fn fetch(&mut self, url: &Url) -> Result<String> {
        self.throttle.acquire().await;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CardlistError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify_error(url, e))?;
        tracing::trace!("{} returned {} bytes", url, body.len());

        Ok(body)
    }

    /// Number of requests sent so far
    pub fn requests_made(&self) -> u32 {
        self.throttle.request_count
    }
}

/// Maps a transport error onto the crate's error taxonomy
fn classify_error(url: &Url, error: reqwest::Error) -> CardlistError {
    if error.is_timeout() {
        CardlistError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        CardlistError::Network {
            url: url.to_string(),
            message: format!("connection failed: {}", error),
        }
    } else {
        CardlistError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
