//! Read side of the store, consumed by reporting.
//!
//! Every query degrades to an empty or zero result when the store is missing,
//! empty or failing. Errors are logged here and never returned.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use super::connection::StoreDb;
use crate::Error;
use crate::model::{CollectionCounts, ScorerRow, SummaryRecord, TeamRecord};

/// Read-only queries over the standings store.
///
/// A store that cannot be opened is retried on the next query, so a reader
/// started before the first scrape or during an outage picks the store up
/// once it is there.
#[derive(Debug, Clone)]
pub struct StandingsReader {
    path: Option<PathBuf>,
    db: Arc<Mutex<Option<StoreDb>>>,
    season: String,
}

fn or_default<T: Default>(query: &'static str, result: Result<T, Error>) -> T {
    result.unwrap_or_else(|e| {
        tracing::error!(query, error = %e, "store read failed, returning default");
        T::default()
    })
}

impl StandingsReader {
    /// Open the store at `path` read-only.
    ///
    /// Never fails: while the store is unreachable every query returns its
    /// default. `season` labels the synthesized summary.
    pub async fn open(path: impl AsRef<Path>, season: impl Into<String>) -> Self {
        let reader = Self { path: Some(path.as_ref().to_path_buf()), db: Arc::default(), season: season.into() };
        reader.db("open").await;
        reader
    }

    pub fn from_db(db: StoreDb, season: impl Into<String>) -> Self {
        Self { path: None, db: Arc::new(Mutex::new(Some(db))), season: season.into() }
    }

    pub async fn is_connected(&self) -> bool {
        self.db.lock().await.is_some()
    }

    async fn db(&self, query: &'static str) -> Option<StoreDb> {
        let mut slot = self.db.lock().await;
        if let Some(db) = slot.as_ref() {
            return Some(db.clone());
        }

        let path = self.path.as_ref()?;
        match StoreDb::open_read_only(path).await {
            Ok(db) => {
                tracing::info!(path = %path.display(), "reader connected to store");
                *slot = Some(db.clone());
                Some(db)
            }
            Err(e) => {
                tracing::warn!(query, path = %path.display(), error = %e, "store unavailable, returning default");
                None
            }
        }
    }

    /// Teams by ascending rank, truncated to `limit`.
    pub async fn list_teams(&self, limit: usize) -> Vec<TeamRecord> {
        match self.db("list_teams").await {
            Some(db) => or_default("list_teams", db.query_teams(limit).await),
            None => Vec::new(),
        }
    }

    /// Teams by descending goals scored, truncated to `limit`.
    pub async fn top_scorers(&self, limit: usize) -> Vec<ScorerRow> {
        match self.db("top_scorers").await {
            Some(db) => or_default("top_scorers", db.query_top_scorers(limit).await),
            None => Vec::new(),
        }
    }

    /// Most recent summary, or one synthesized from the current team count.
    pub async fn latest_summary(&self) -> SummaryRecord {
        let latest = match self.db("latest_summary").await {
            Some(db) => or_default("latest_summary", db.query_latest_summary().await),
            None => None,
        };

        match latest {
            Some(summary) => summary,
            None => SummaryRecord {
                season: self.season.clone(),
                matchday: 0,
                team_count: self.total_team_count().await as i64,
                match_count: 0,
                captured_at: Utc::now(),
            },
        }
    }

    pub async fn total_team_count(&self) -> u64 {
        match self.db("total_team_count").await {
            Some(db) => or_default("total_team_count", db.count_teams().await),
            None => 0,
        }
    }

    /// Sum of goals scored over the current snapshot.
    pub async fn total_goals(&self) -> i64 {
        match self.db("total_goals").await {
            Some(db) => or_default("total_goals", db.sum_goals_for().await),
            None => 0,
        }
    }

    pub async fn collection_counts(&self) -> CollectionCounts {
        match self.db("collection_counts").await {
            Some(db) => or_default("collection_counts", db.collection_counts().await),
            None => CollectionCounts::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreWriter;
    use chrono::{DateTime, TimeZone};

    const MISSING: &str = "/nonexistent-standings-dir/standings.sqlite";

    fn team(rank: i64, name: &str, goals_for: i64) -> TeamRecord {
        TeamRecord {
            rank,
            name: name.into(),
            points: 30 - rank,
            played: 12,
            won: 7,
            drawn: 3,
            lost: 2,
            goals_for,
            goals_against: 10,
            goal_difference: goals_for - 10,
            recent_form: String::new(),
            captured_at: Utc.with_ymd_and_hms(2025, 11, 9, 20, 0, 0).unwrap(),
        }
    }

    async fn seeded() -> StandingsReader {
        let db = StoreDb::open_in_memory().await.unwrap();
        let writer = StoreWriter::with_db(db.clone());
        writer.upsert_team(&team(2, "Monaco", 20)).await.unwrap();
        writer.upsert_team(&team(1, "Lens", 10)).await.unwrap();
        writer.upsert_team(&team(3, "Paris Saint-Germain", 30)).await.unwrap();
        StandingsReader::from_db(db, "2025-2026")
    }

    #[tokio::test]
    async fn test_list_teams_limit() {
        let reader = seeded().await;
        let teams = reader.list_teams(2).await;
        assert_eq!(teams.len(), 2);
        assert_eq!((teams[0].rank, teams[1].rank), (1, 2));
    }

    #[tokio::test]
    async fn test_top_scorers() {
        let reader = seeded().await;
        let scorers = reader.top_scorers(10).await;
        let names: Vec<&str> = scorers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Paris Saint-Germain", "Monaco", "Lens"]);
    }

    #[tokio::test]
    async fn test_aggregates() {
        let reader = seeded().await;
        assert_eq!(reader.total_goals().await, 60);
        assert_eq!(reader.total_team_count().await, 3);
    }

    #[tokio::test]
    async fn test_latest_summary_synthesized_from_team_count() {
        let reader = seeded().await;
        let summary = reader.latest_summary().await;
        assert_eq!(summary.team_count, 3);
        assert_eq!(summary.season, "2025-2026");
        assert_eq!(summary.matchday, 0);
    }

    #[tokio::test]
    async fn test_latest_summary_prefers_stored() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let captured_at: DateTime<Utc> = Utc.with_ymd_and_hms(2025, 11, 9, 20, 0, 0).unwrap();
        let stored =
            SummaryRecord { season: "2025-2026".into(), matchday: 12, team_count: 18, match_count: 0, captured_at };
        db.append_summary(&stored).await.unwrap();

        let reader = StandingsReader::from_db(db, "ignored");
        assert_eq!(reader.latest_summary().await, stored);
    }

    #[tokio::test]
    async fn test_unreachable_store_returns_defaults() {
        let reader = StandingsReader::open(MISSING, "2025-2026").await;
        assert!(!reader.is_connected().await);
        assert!(reader.list_teams(20).await.is_empty());
        assert!(reader.top_scorers(10).await.is_empty());
        assert_eq!(reader.total_team_count().await, 0);
        assert_eq!(reader.total_goals().await, 0);
        assert!(reader.collection_counts().await.is_empty());

        let summary = reader.latest_summary().await;
        assert_eq!(summary.team_count, 0);
        assert_eq!(summary.season, "2025-2026");
    }

    #[tokio::test]
    async fn test_reader_picks_up_store_created_later() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("standings.sqlite");

        let reader = StandingsReader::open(&path, "2025-2026").await;
        assert!(!reader.is_connected().await);
        assert!(reader.list_teams(20).await.is_empty());

        let writer = StoreWriter::new(&path);
        writer.upsert_team(&team(1, "Lens", 10)).await.unwrap();

        let teams = reader.list_teams(20).await;
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].name, "Lens");
        assert!(reader.is_connected().await);
        assert_eq!(reader.total_goals().await, 10);
    }

    #[tokio::test]
    async fn test_cloned_reader_shares_connection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("standings.sqlite");

        let reader = StandingsReader::open(&path, "2025-2026").await;
        let clone = reader.clone();
        StoreWriter::new(&path).upsert_team(&team(2, "Monaco", 20)).await.unwrap();

        assert_eq!(clone.total_team_count().await, 1);
        assert!(reader.is_connected().await);
    }

    #[tokio::test]
    async fn test_empty_store_returns_defaults() {
        let reader = StandingsReader::from_db(StoreDb::open_in_memory().await.unwrap(), "2025-2026");
        assert!(reader.list_teams(20).await.is_empty());
        assert_eq!(reader.total_goals().await, 0);
        assert_eq!(reader.latest_summary().await.team_count, 0);
    }

    #[tokio::test]
    async fn test_failing_queries_degrade() {
        let db = StoreDb::open_in_memory().await.unwrap();
        db.conn
            .call(|conn| conn.execute_batch("DROP TABLE teams; DROP TABLE summaries;"))
            .await
            .unwrap();

        let reader = StandingsReader::from_db(db, "2025-2026");
        assert!(reader.is_connected().await);
        assert!(reader.list_teams(5).await.is_empty());
        assert!(reader.top_scorers(5).await.is_empty());
        assert_eq!(reader.total_goals().await, 0);
        assert_eq!(reader.latest_summary().await.team_count, 0);
    }
}
