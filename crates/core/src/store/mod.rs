//! SQLite-backed document store for standings.
//!
//! Two collections live here:
//!
//! - `teams`: the current snapshot, one document per team name, replaced in place
//! - `summaries`: one appended document per successful run
//!
//! [`StoreWriter`] is the only component that mutates either collection.
//! [`StandingsReader`] is the read-only face used by reporting, and never
//! surfaces an error to its caller.

pub mod connection;
pub mod migrations;
pub mod reader;
pub mod summaries;
pub mod teams;
pub mod writer;

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use tokio_rusqlite::rusqlite;

use crate::Error;
use crate::model::CollectionCounts;

pub use connection::StoreDb;
pub use reader::StandingsReader;
pub use writer::StoreWriter;

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

impl StoreDb {
    /// Document counts for both collections.
    pub async fn collection_counts(&self) -> Result<CollectionCounts, Error> {
        Ok(CollectionCounts { teams: self.count_teams().await?, summaries: self.count_summaries().await? })
    }

    /// Document counts for the store at `path`, opened read-only.
    ///
    /// A store file that has not been created yet, or that has no collections
    /// yet, counts as empty. A missing parent directory or an unopenable file
    /// is an error.
    pub async fn inspect(path: impl AsRef<Path>) -> Result<CollectionCounts, Error> {
        let path = path.as_ref();

        if !path.exists() {
            let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
            if parent.is_dir() {
                tracing::debug!(path = %path.display(), "store not created yet");
                return Ok(CollectionCounts::default());
            }
            return Err(Error::StoreUnavailable(format!("{}: directory does not exist", path.display())));
        }

        let db = Self::open_read_only(path).await?;
        match db.collection_counts().await {
            Err(e) if e.is_missing_table() => Ok(CollectionCounts::default()),
            counts => counts,
        }
    }
}
