//! Write side of the store.

use std::path::{Path, PathBuf};

use tokio::sync::OnceCell;

use super::connection::StoreDb;
use crate::Error;
use crate::model::{StoreRecord, SummaryRecord, TeamRecord};

/// Sole writer of team and summary documents.
///
/// Holds the store target and opens the connection on first use; later calls
/// reuse it. Create one per run and drop it when the run ends.
#[derive(Debug)]
pub struct StoreWriter {
    target: PathBuf,
    db: OnceCell<StoreDb>,
}

impl StoreWriter {
    /// Writer for the store at `path`. Nothing is opened until the first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { target: path.as_ref().to_path_buf(), db: OnceCell::new() }
    }

    /// Writer over an already open store.
    pub fn with_db(db: StoreDb) -> Self {
        Self { target: PathBuf::from(":memory:"), db: OnceCell::new_with(Some(db)) }
    }

    pub fn is_connected(&self) -> bool {
        self.db.initialized()
    }

    /// Open the store if it is not open yet.
    pub async fn connect(&self) -> Result<&StoreDb, Error> {
        self.db
            .get_or_try_init(|| async {
                match StoreDb::open(&self.target).await {
                    Ok(db) => {
                        tracing::info!(target_path = %self.target.display(), "connected to store");
                        Ok(db)
                    }
                    Err(e) => {
                        tracing::error!(target_path = %self.target.display(), error = %e, "store unreachable");
                        Err(e)
                    }
                }
            })
            .await
    }

    /// Replace the document for `record.name`, or insert it.
    pub async fn upsert_team(&self, record: &TeamRecord) -> Result<(), Error> {
        let db = self.connect().await?;
        match db.upsert_team(record).await {
            Ok(()) => {
                tracing::info!(team = %record.name, rank = record.rank, points = record.points, "team saved");
                Ok(())
            }
            Err(e) => {
                tracing::error!(team = %record.name, error = %e, "failed to save team");
                Err(e)
            }
        }
    }

    /// Append one summary document.
    pub async fn append_summary(&self, record: &SummaryRecord) -> Result<(), Error> {
        let db = self.connect().await?;
        match db.append_summary(record).await {
            Ok(id) => {
                tracing::info!(id, season = %record.season, matchday = record.matchday, "summary saved");
                Ok(())
            }
            Err(e) => {
                tracing::error!(season = %record.season, error = %e, "failed to save summary");
                Err(e)
            }
        }
    }

    /// Route a record to its collection.
    pub async fn write(&self, record: &StoreRecord) -> Result<(), Error> {
        tracing::debug!(collection = record.collection(), captured_at = %record.captured_at(), "writing record");
        match record {
            StoreRecord::Team(team) => self.upsert_team(team).await,
            StoreRecord::Summary(summary) => self.append_summary(summary).await,
        }
    }
}
