//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `source_url` is not an http(s) URL
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent`, `season` or `points_marker` is empty
    /// - `run_timeout_secs` or `interval_hours` is 0
    /// - `table_selectors` is empty or holds an unparsable selector
    /// - `known_teams` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.source_url.starts_with("https://") || self.source_url.starts_with("http://")) {
            return Err(invalid("source_url", "must be an http or https URL"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        if self.season.trim().is_empty() {
            return Err(invalid("season", "must not be empty"));
        }

        if self.run_timeout_secs == 0 {
            return Err(invalid("run_timeout_secs", "must be greater than 0"));
        }
        if self.interval_hours == 0 {
            return Err(invalid("interval_hours", "must be greater than 0"));
        }
        if self.run_timeout_secs > self.interval_hours * 3600 {
            tracing::warn!(
                run_timeout_secs = self.run_timeout_secs,
                interval_hours = self.interval_hours,
                "run timeout is longer than the schedule interval; ticks will be delayed"
            );
        }

        if self.table_selectors.is_empty() {
            return Err(invalid("table_selectors", "must list at least one selector"));
        }
        for selector in &self.table_selectors {
            if scraper::Selector::parse(selector).is_err() {
                return Err(invalid("table_selectors", format!("unparsable selector {selector:?}")));
            }
        }

        if self.points_marker.is_empty() {
            return Err(invalid("points_marker", "must not be empty"));
        }
        if self.known_teams.iter().all(|t| t.trim().is_empty()) {
            return Err(invalid("known_teams", "must list at least one team"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(config: AppConfig, expected: &str) {
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == expected));
    }

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_source_url_scheme() {
        assert_invalid(AppConfig { source_url: "ftp://example.com".into(), ..Default::default() }, "source_url");
    }

    #[test]
    fn test_validate_max_bytes_zero() {
        assert_invalid(AppConfig { max_bytes: 0, ..Default::default() }, "max_bytes");
    }

    #[test]
    fn test_validate_timeout_bounds() {
        assert_invalid(AppConfig { timeout_ms: 50, ..Default::default() }, "timeout_ms");
        assert_invalid(AppConfig { timeout_ms: 301_000, ..Default::default() }, "timeout_ms");
    }

    #[test]
    fn test_validate_empty_user_agent() {
        assert_invalid(AppConfig { user_agent: "  ".into(), ..Default::default() }, "user_agent");
    }

    #[test]
    fn test_validate_zero_run_timeout() {
        assert_invalid(AppConfig { run_timeout_secs: 0, ..Default::default() }, "run_timeout_secs");
    }

    #[test]
    fn test_validate_zero_interval() {
        assert_invalid(AppConfig { interval_hours: 0, ..Default::default() }, "interval_hours");
    }

    #[test]
    fn test_validate_selectors() {
        assert_invalid(AppConfig { table_selectors: vec![], ..Default::default() }, "table_selectors");
        assert_invalid(
            AppConfig { table_selectors: vec!["table[".into()], ..Default::default() },
            "table_selectors",
        );
    }

    #[test]
    fn test_validate_known_teams() {
        assert_invalid(AppConfig { known_teams: vec![], ..Default::default() }, "known_teams");
        assert_invalid(AppConfig { known_teams: vec![" ".into()], ..Default::default() }, "known_teams");
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { max_bytes: 1, timeout_ms: 100, run_timeout_secs: 1, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
