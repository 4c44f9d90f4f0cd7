//! robots.txt compliance with caching.
//!
//! Fetches and caches robots.txt files per-host, respecting a 24-hour TTL.

use robotstxt_rs::RobotsTxt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use url::Url;

/// Default TTL for robots.txt cache (24 hours).
const ROBOTS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Maximum size of robots.txt to fetch (1MB).
const MAX_ROBOTS_SIZE: usize = 1024 * 1024;

/// Error type for robots.txt operations.
#[derive(Debug, thiserror::Error)]
pub enum RobotsError {
    #[error("robots.txt disallowed: {path} (robots_url: {robots_url})")]
    Disallowed { path: String, robots_url: String },

    #[error("failed to fetch robots.txt: {0}")]
    FetchError(String),

    #[error("robots.txt too large")]
    TooLarge,
}

/// Cached robots.txt entry with timestamp.
struct CachedRobots {
    robots: RobotsTxt,
    fetched_at: Instant,
}

impl CachedRobots {
    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > ROBOTS_TTL
    }
}

fn robots_url_for(url: &Url) -> String {
    match url.port() {
        Some(port) => format!("{}://{}:{}/robots.txt", url.scheme(), url.host_str().unwrap_or(""), port),
        None => format!("{}://{}/robots.txt", url.scheme(), url.host_str().unwrap_or("")),
    }
}

/// In-memory cache for robots.txt files keyed by robots.txt URL.
pub struct RobotsCache {
    cache: Arc<RwLock<HashMap<String, CachedRobots>>>,
    user_agent: String,
    http: reqwest::Client,
}

impl RobotsCache {
    /// Create a new robots.txt cache that fetches with `http`.
    pub fn new(user_agent: String, http: reqwest::Client) -> Self {
        Self { cache: Arc::new(RwLock::new(HashMap::new())), user_agent, http }
    }

    /// Ensure `url` may be fetched by this client's User-Agent.
    ///
    /// Fetches and caches robots.txt for the host if not already cached.
    pub async fn check(&self, url: &Url) -> Result<(), RobotsError> {
        let robots_url = robots_url_for(url);

        let cached = {
            let cache = self.cache.read().await;
            cache
                .get(&robots_url)
                .filter(|cached| !cached.is_expired())
                .map(|cached| cached.robots.can_fetch(&self.user_agent, url.as_str()))
        };

        let allowed = match cached {
            Some(allowed) => {
                tracing::debug!(%robots_url, allowed, "robots.txt cache hit");
                allowed
            }
            None => {
                let robots = self.fetch_robots(&robots_url).await?;
                let allowed = robots.can_fetch(&self.user_agent, url.as_str());
                let mut cache = self.cache.write().await;
                cache.insert(robots_url.clone(), CachedRobots { robots, fetched_at: Instant::now() });
                allowed
            }
        };

        if allowed {
            Ok(())
        } else {
            Err(RobotsError::Disallowed { path: url.path().to_string(), robots_url })
        }
    }

    /// Fetch robots.txt from the given URL.
    ///
    /// A 4xx answer means no rules apply.
    async fn fetch_robots(&self, url: &str) -> Result<RobotsTxt, RobotsError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RobotsError::FetchError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            if let Some(len) = response.content_length()
                && len as usize > MAX_ROBOTS_SIZE
            {
                return Err(RobotsError::TooLarge);
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| RobotsError::FetchError(e.to_string()))?;

            if bytes.len() > MAX_ROBOTS_SIZE {
                return Err(RobotsError::TooLarge);
            }

            Ok(RobotsTxt::parse(&String::from_utf8_lossy(&bytes)))
        } else if status.is_client_error() {
            tracing::debug!(robots_url = url, status = status.as_u16(), "no robots.txt, allowing all");
            Ok(RobotsTxt::parse(""))
        } else {
            Err(RobotsError::FetchError(format!("status {status}")))
        }
    }

    /// Clear expired entries from the cache.
    pub async fn cleanup_expired(&self) {
        let mut cache = self.cache.write().await;
        cache.retain(|_, cached| !cached.is_expired());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIKI_ROBOTS: &str = "User-agent: *\nDisallow: /w/\nAllow: /wiki/\n";

    fn cache() -> RobotsCache {
        RobotsCache::new("standings-scraper/0.1".to_string(), reqwest::Client::new())
    }

    async fn seed(cache: &RobotsCache, robots_url: &str, body: &str) {
        cache.cache.write().await.insert(
            robots_url.to_string(),
            CachedRobots { robots: RobotsTxt::parse(body), fetched_at: Instant::now() },
        );
    }

    #[test]
    fn test_cached_robots_expiry() {
        let robots = RobotsTxt::parse("User-agent: *\nAllow: /");
        let mut cached = CachedRobots { robots, fetched_at: Instant::now() };
        assert!(!cached.is_expired());

        cached.fetched_at = Instant::now() - ROBOTS_TTL - Duration::from_secs(1);
        assert!(cached.is_expired());
    }

    #[test]
    fn test_robots_url_for() {
        let url = Url::parse("https://fr.wikipedia.org/wiki/Ligue_1?x=1").unwrap();
        assert_eq!(robots_url_for(&url), "https://fr.wikipedia.org/robots.txt");

        let url = Url::parse("http://localhost:8080/standings").unwrap();
        assert_eq!(robots_url_for(&url), "http://localhost:8080/robots.txt");
    }

    #[tokio::test]
    async fn test_check_allowed_from_cache() {
        let cache = cache();
        seed(&cache, "https://fr.wikipedia.org/robots.txt", WIKI_ROBOTS).await;

        let url = Url::parse("https://fr.wikipedia.org/wiki/Championnat_de_France_de_football_2025-2026").unwrap();
        assert!(cache.check(&url).await.is_ok());
    }

    #[tokio::test]
    async fn test_check_disallowed_from_cache() {
        let cache = cache();
        seed(&cache, "https://fr.wikipedia.org/robots.txt", WIKI_ROBOTS).await;

        let url = Url::parse("https://fr.wikipedia.org/w/index.php?title=Ligue_1").unwrap();
        let result = cache.check(&url).await;
        assert!(matches!(result, Err(RobotsError::Disallowed { ref path, .. }) if path == "/w/index.php"));
    }

    #[tokio::test]
    async fn test_robots_cache_cleanup() {
        let cache = cache();
        cache.cache.write().await.insert(
            "https://example.com/robots.txt".to_string(),
            CachedRobots {
                robots: RobotsTxt::parse("User-agent: *\nAllow: /"),
                fetched_at: Instant::now() - ROBOTS_TTL - Duration::from_secs(1),
            },
        );

        cache.cleanup_expired().await;

        assert!(cache.cache.read().await.is_empty());
    }
}
