//! HTTP fetch pipeline with politeness controls.
//!
//! ### URL Canonicalization
//! - Trim whitespace, ensure scheme (default: `https`)
//! - Lowercase host, remove fragments
//! - Preserve query string
//!
//! ### Politeness
//! - Identifying User-Agent on every request.
//! - Fetch and cache `robots.txt` per host (24h cache), evaluated for the
//!   configured User-Agent.
//! - Minimum delay between consecutive requests from one client.
//!
//! ### Limits
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)

pub mod robots;
pub mod throttle;
pub mod url;

use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, StatusCode, header};
use std::time::{Duration, Instant};

pub use robots::{RobotsCache, RobotsError};
pub use throttle::Throttle;
pub use url::{UrlError, canonicalize};

use standings_core::{AppConfig, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "standings-scraper/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Whether to respect robots.txt (default: true)
    pub respect_robots: bool,

    /// Minimum spacing between requests (default: 2s)
    pub request_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "standings-scraper/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
            respect_robots: true,
            request_delay: Duration::from_secs(2),
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            respect_robots: config.respect_robots,
            request_delay: config.request_delay(),
            ..Default::default()
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The original URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

fn request_error(err: &reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(format!("no response within {}ms", timeout.as_millis()))
    } else {
        Error::HttpError(format!("network error: {err}"))
    }
}

/// HTTP fetch client with politeness checks.
///
/// Keep one per process: the robots.txt cache and the request throttle live
/// inside it.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
    robots_cache: RobotsCache,
    throttle: Throttle,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::InvalidInput(format!("failed to build HTTP client: {e}")))?;

        let robots_cache = RobotsCache::new(config.user_agent.clone(), http.clone());
        let throttle = Throttle::new(config.request_delay);

        Ok(Self { http, config, robots_cache, throttle })
    }

    /// Fetch a URL, returning raw bytes and metadata.
    ///
    /// Performs the robots.txt check and waits for the throttle before
    /// sending, then enforces status and byte limits.
    pub async fn fetch(&self, url_str: &str) -> Result<FetchResponse, Error> {
        let url = canonicalize(url_str).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        if self.config.respect_robots {
            self.robots_cache.check(&url).await.map_err(|e| match e {
                RobotsError::Disallowed { .. } => Error::RobotsDisallowed(e.to_string()),
                _ => Error::HttpError(e.to_string()),
            })?;
        }

        self.throttle.wait().await;

        let start = Instant::now();
        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| request_error(&e, self.config.timeout))?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::HttpError(format!("status {} from {}", status.as_u16(), url)));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_error(&e, self.config.timeout))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        Ok(FetchResponse { url, final_url, status, content_type, bytes, fetch_ms })
    }

    /// Fetch a URL and decode the body as HTML text.
    pub async fn fetch_html(&self, url_str: &str) -> Result<String, Error> {
        let response = self.fetch(url_str).await?;

        if let Some(content_type) = response.content_type.as_deref()
            && !content_type.contains("html")
        {
            tracing::warn!(url = %response.final_url, content_type, "page is not served as HTML");
        }

        tracing::info!(
            url = %response.final_url,
            status = response.status.as_u16(),
            fetch_ms = response.fetch_ms,
            bytes = response.bytes.len(),
            "page fetched"
        );

        Ok(response.text())
    }
}
