//! Store schema migrations.
//!
//! Each migration runs in its own transaction together with its row in
//! `_migrations`, so a failed step leaves the store at the previous version.

use crate::Error;
use tokio_rusqlite::{Connection, params, rusqlite};

/// One numbered schema step.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Applied in ascending version order.
pub(crate) const MIGRATIONS: &[Migration] = &[
    Migration { version: 1, name: "teams", sql: include_str!("../../migrations/001_teams.sql") },
    Migration { version: 2, name: "summaries", sql: include_str!("../../migrations/002_summaries.sql") },
];

fn current_version(conn: &rusqlite::Connection) -> Result<i64, Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?)
}

fn apply_step(conn: &mut rusqlite::Connection, step: &Migration) -> Result<(), Error> {
    let failed = |e: rusqlite::Error| Error::MigrationFailed(format!("{} ({}): {e}", step.version, step.name));

    let tx = conn.transaction().map_err(failed)?;
    tx.execute_batch(step.sql).map_err(failed)?;
    tx.execute(
        "INSERT INTO _migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        params![step.version, step.name, chrono::Utc::now().to_rfc3339()],
    )
    .map_err(failed)?;
    tx.commit().map_err(failed)
}

async fn apply(conn: &Connection, migrations: &'static [Migration]) -> Result<i64, Error> {
    conn.call(move |conn| -> Result<i64, Error> {
        let mut version = current_version(conn)?;
        let start = version;

        for step in migrations.iter().filter(|m| m.version > start) {
            apply_step(conn, step)?;
            tracing::debug!(version = step.version, name = step.name, "applied store migration");
            version = step.version;
        }

        Ok(version)
    })
    .await
    .map_err(Error::from)
}

/// Bring the schema up to the latest version.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    apply(conn, MIGRATIONS).await.map(|_| ())
}
