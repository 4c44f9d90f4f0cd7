//! Append-only per-run summary documents.

use super::connection::StoreDb;
use super::{format_timestamp, parse_timestamp};
use crate::Error;
use crate::model::SummaryRecord;
use tokio_rusqlite::params;

impl StoreDb {
    /// Insert a new summary row. Never replaces an existing one.
    pub async fn append_summary(&self, record: &SummaryRecord) -> Result<i64, Error> {
        let record = record.clone();
        self.conn
            .call(move |conn| -> Result<i64, Error> {
                conn.execute(
                    "INSERT INTO summaries (season, matchday, team_count, match_count, captured_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        &record.season,
                        record.matchday,
                        record.team_count,
                        record.match_count,
                        format_timestamp(&record.captured_at),
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(Error::from)
    }

    /// The summary with the most recent capture time, if any.
    ///
    /// Ties on `captured_at` resolve to the row inserted last.
    pub async fn query_latest_summary(&self) -> Result<Option<SummaryRecord>, Error> {
        self.conn
            .call(|conn| -> Result<Option<SummaryRecord>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT season, matchday, team_count, match_count, captured_at
                    FROM summaries ORDER BY captured_at DESC, id DESC LIMIT 1",
                )?;

                let result = stmt.query_row([], |row| {
                    Ok(SummaryRecord {
                        season: row.get(0)?,
                        matchday: row.get(1)?,
                        team_count: row.get(2)?,
                        match_count: row.get(3)?,
                        captured_at: parse_timestamp(4, row.get(4)?)?,
                    })
                });

                match result {
                    Ok(s) => Ok(Some(s)),
                    Err(tokio_rusqlite::rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    pub async fn count_summaries(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM summaries", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
