//! Unified error types for the standings scraper.
//!
//! Variants are grouped by the stage of a run that produced them so that a
//! locator miss is never confused with an unreachable page or a lost write.

use tokio_rusqlite::rusqlite;

/// Broad failure class of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source page could not be retrieved.
    Fetch,
    /// The page loaded but no table matched the expected structure.
    Locate,
    /// The store could not be opened, read or written.
    Store,
    /// The run as a whole exceeded its time budget.
    Run,
    /// A caller supplied something unusable.
    Input,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Fetch => "fetch",
            ErrorKind::Locate => "locate",
            ErrorKind::Store => "store",
            ErrorKind::Run => "run",
            ErrorKind::Input => "input",
        }
    }
}

/// Unified error type for the standings pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Robots.txt disallowed access.
    #[error("ROBOTS_DISALLOWED: {0}")]
    RobotsDisallowed(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Network failure or non-success HTTP status.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// No candidate table carried both the points marker and a known team.
    #[error("TABLE_NOT_FOUND: no table contains {marker:?} and any of {known_teams:?}")]
    TableNotFound { marker: String, known_teams: Vec<String> },

    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// The store could not be reached at all.
    #[error("STORE_UNAVAILABLE: {0}")]
    StoreUnavailable(String),

    /// A run exceeded its hard time limit and was cancelled.
    #[error("RUN_TIMEOUT: run exceeded {0}s")]
    RunTimeout(u64),
}

impl Error {
    /// Failure class used to tag log events.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::Input,
            Error::InvalidUrl(_)
            | Error::RobotsDisallowed(_)
            | Error::FetchTimeout(_)
            | Error::FetchTooLarge(_)
            | Error::HttpError(_) => ErrorKind::Fetch,
            Error::TableNotFound { .. } => ErrorKind::Locate,
            Error::Database(_) | Error::MigrationFailed(_) | Error::StoreUnavailable(_) => ErrorKind::Store,
            Error::RunTimeout(_) => ErrorKind::Run,
        }
    }

    /// Whether a query hit a table that has not been created yet.
    pub fn is_missing_table(&self) -> bool {
        matches!(
            self,
            Error::Database(tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(_, Some(msg))))
                if msg.starts_with("no such table")
        )
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::HttpError("status 503".to_string());
        assert!(err.to_string().contains("HTTP_ERROR"));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_table_not_found_names_allowlist() {
        let err = Error::TableNotFound { marker: "Pts".into(), known_teams: vec!["Lens".into()] };
        let msg = err.to_string();
        assert!(msg.starts_with("TABLE_NOT_FOUND"));
        assert!(msg.contains("Pts"));
        assert!(msg.contains("Lens"));
    }

    #[test]
    fn test_locator_miss_is_distinct_from_fetch_failure() {
        let miss = Error::TableNotFound { marker: "Pts".into(), known_teams: vec![] };
        let fetch = Error::FetchTimeout("20s".into());
        assert_eq!(miss.kind(), ErrorKind::Locate);
        assert_eq!(fetch.kind(), ErrorKind::Fetch);
        assert_ne!(miss.kind(), fetch.kind());
    }

    #[test]
    fn test_missing_table_detection() {
        let missing = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(1),
            Some("no such table: teams".to_string()),
        );
        assert!(Error::from(missing).is_missing_table());

        let other = rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(14), Some("unable to open".to_string()));
        assert!(!Error::from(other).is_missing_table());
        assert!(!Error::StoreUnavailable("no such table".into()).is_missing_table());
    }

    #[test]
    fn test_store_errors_classified() {
        assert_eq!(Error::StoreUnavailable("x".into()).kind(), ErrorKind::Store);
        assert_eq!(Error::MigrationFailed("x".into()).kind(), ErrorKind::Store);
        assert_eq!(Error::RunTimeout(300).kind().as_str(), "run");
    }
}
