//! Current-snapshot team documents.
//!
//! One row per team name; every write replaces the whole row.

use super::connection::StoreDb;
use super::{format_timestamp, parse_timestamp};
use crate::Error;
use crate::model::{ScorerRow, TeamRecord};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::Row;

const TEAM_COLUMNS: &str = "rank, name, points, played, won, drawn, lost,
    goals_for, goals_against, goal_difference, recent_form, captured_at";

fn team_from_row(row: &Row<'_>) -> tokio_rusqlite::rusqlite::Result<TeamRecord> {
    Ok(TeamRecord {
        rank: row.get(0)?,
        name: row.get(1)?,
        points: row.get(2)?,
        played: row.get(3)?,
        won: row.get(4)?,
        drawn: row.get(5)?,
        lost: row.get(6)?,
        goals_for: row.get(7)?,
        goals_against: row.get(8)?,
        goal_difference: row.get(9)?,
        recent_form: row.get(10)?,
        captured_at: parse_timestamp(11, row.get(11)?)?,
    })
}

impl StoreDb {
    /// Insert or replace the team document keyed by `record.name`.
    pub async fn upsert_team(&self, record: &TeamRecord) -> Result<(), Error> {
        let record = record.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO teams (
                    rank, name, points, played, won, drawn, lost,
                    goals_for, goals_against, goal_difference, recent_form, captured_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                ON CONFLICT(name) DO UPDATE SET
                    rank = excluded.rank,
                    points = excluded.points,
                    played = excluded.played,
                    won = excluded.won,
                    drawn = excluded.drawn,
                    lost = excluded.lost,
                    goals_for = excluded.goals_for,
                    goals_against = excluded.goals_against,
                    goal_difference = excluded.goal_difference,
                    recent_form = excluded.recent_form,
                    captured_at = excluded.captured_at",
                    params![
                        record.rank,
                        &record.name,
                        record.points,
                        record.played,
                        record.won,
                        record.drawn,
                        record.lost,
                        record.goals_for,
                        record.goals_against,
                        record.goal_difference,
                        &record.recent_form,
                        format_timestamp(&record.captured_at),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Teams ordered by ascending rank, at most `limit` of them.
    pub async fn query_teams(&self, limit: usize) -> Result<Vec<TeamRecord>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<TeamRecord>, Error> {
                let mut stmt =
                    conn.prepare(&format!("SELECT {TEAM_COLUMNS} FROM teams ORDER BY rank ASC, name ASC LIMIT ?1"))?;
                let teams = stmt
                    .query_map(params![limit], team_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(teams)
            })
            .await
            .map_err(Error::from)
    }

    /// Get one team by name.
    pub async fn get_team(&self, name: &str) -> Result<Option<TeamRecord>, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<Option<TeamRecord>, Error> {
                let mut stmt = conn.prepare(&format!("SELECT {TEAM_COLUMNS} FROM teams WHERE name = ?1"))?;
                match stmt.query_row(params![name], team_from_row) {
                    Ok(team) => Ok(Some(team)),
                    Err(tokio_rusqlite::rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Teams ordered by descending goals scored, projected to name/goals/rank.
    pub async fn query_top_scorers(&self, limit: usize) -> Result<Vec<ScorerRow>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<ScorerRow>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT name, goals_for, rank FROM teams
                    ORDER BY goals_for DESC, rank ASC LIMIT ?1",
                )?;
                let rows = stmt
                    .query_map(params![limit], |row| {
                        Ok(ScorerRow { name: row.get(0)?, goals_for: row.get(1)?, rank: row.get(2)? })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn count_teams(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM teams", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Sum of goals scored across the current snapshot; 0 when empty.
    pub async fn sum_goals_for(&self) -> Result<i64, Error> {
        self.conn
            .call(|conn| -> Result<i64, Error> {
                let total: i64 = conn.query_row("SELECT COALESCE(SUM(goals_for), 0) FROM teams", [], |row| row.get(0))?;
                Ok(total)
            })
            .await
            .map_err(Error::from)
    }
}
