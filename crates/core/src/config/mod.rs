//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (STANDINGS_*)
//! 2. TOML config file (if STANDINGS_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (STANDINGS_*)
/// 2. TOML config file (if STANDINGS_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Page carrying the standings table.
    ///
    /// Set via STANDINGS_SOURCE_URL environment variable.
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// Season label written to every summary record.
    #[serde(default = "default_season")]
    pub season: String,

    /// Path to the SQLite store.
    ///
    /// Set via STANDINGS_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via STANDINGS_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Whether to respect robots.txt rules.
    ///
    /// Set via STANDINGS_RESPECT_ROBOTS environment variable.
    #[serde(default = "default_true")]
    pub respect_robots: bool,

    /// Minimum delay between two requests to the source host, in milliseconds.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Hard limit on a single run, in seconds.
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,

    /// Scheduler cadence in hours.
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,

    /// Candidate table selectors, most specific first.
    #[serde(default = "default_table_selectors")]
    pub table_selectors: Vec<String>,

    /// Header text that the standings table must contain.
    #[serde(default = "default_points_marker")]
    pub points_marker: String,

    /// Teams known to appear in the current competition.
    ///
    /// Needs updating when membership changes between seasons. Set via
    /// STANDINGS_KNOWN_TEAMS='["Lens","Monaco"]'.
    #[serde(default = "default_known_teams")]
    pub known_teams: Vec<String>,
}

fn default_source_url() -> String {
    "https://fr.wikipedia.org/wiki/Championnat_de_France_de_football_2025-2026".into()
}

fn default_season() -> String {
    "2025-2026".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./standings.sqlite")
}

fn default_user_agent() -> String {
    "standings-scraper/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_true() -> bool {
    true
}

fn default_request_delay_ms() -> u64 {
    2_000
}

fn default_run_timeout_secs() -> u64 {
    300
}

fn default_interval_hours() -> u64 {
    6
}

fn default_table_selectors() -> Vec<String> {
    vec!["table.wikitable".into(), "table".into()]
}

fn default_points_marker() -> String {
    "Pts".into()
}

fn default_known_teams() -> Vec<String> {
    vec!["Paris Saint-Germain".into(), "Lens".into(), "Monaco".into()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            season: default_season(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            respect_robots: true,
            request_delay_ms: default_request_delay_ms(),
            run_timeout_secs: default_run_timeout_secs(),
            interval_hours: default_interval_hours(),
            table_selectors: default_table_selectors(),
            points_marker: default_points_marker(),
            known_teams: default_known_teams(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_hours * 60 * 60)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `STANDINGS_`
    /// 2. TOML file from `STANDINGS_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("STANDINGS_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("STANDINGS_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./standings.sqlite"));
        assert_eq!(config.user_agent, "standings-scraper/0.1");
        assert_eq!(config.season, "2025-2026");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert!(config.respect_robots);
        assert_eq!(config.table_selectors, vec!["table.wikitable", "table"]);
        assert_eq!(config.points_marker, "Pts");
        assert_eq!(config.known_teams.len(), 3);
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
        assert_eq!(config.request_delay(), Duration::from_secs(2));
        assert_eq!(config.run_timeout(), Duration::from_secs(300));
        assert_eq!(config.interval(), Duration::from_secs(6 * 3600));
    }

    #[test]
    fn test_load_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STANDINGS_DB_PATH", "/tmp/other.sqlite");
            jail.set_env("STANDINGS_SEASON", "2026-2027");
            jail.set_env("STANDINGS_KNOWN_TEAMS", r#"["Lorient", "Metz"]"#);

            let config = AppConfig::load().unwrap();
            assert_eq!(config.db_path, PathBuf::from("/tmp/other.sqlite"));
            assert_eq!(config.season, "2026-2027");
            assert_eq!(config.known_teams, vec!["Lorient", "Metz"]);
            Ok(())
        });
    }

    #[test]
    fn test_load_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("standings.toml", "interval_hours = 2\npoints_marker = \"Points\"\n")?;
            jail.set_env("STANDINGS_CONFIG_FILE", "standings.toml");

            let config = AppConfig::load().unwrap();
            assert_eq!(config.interval_hours, 2);
            assert_eq!(config.points_marker, "Points");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STANDINGS_RUN_TIMEOUT_SECS", "0");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { .. })));
            Ok(())
        });
    }
}
