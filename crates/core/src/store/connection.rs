//! Database connection management with pragma configuration.
//!
//! Writers open the store read-write (creating and migrating it on demand);
//! readers open it read-only so a missing store is reported, never created.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;
use tokio_rusqlite::rusqlite::OpenFlags;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// Store database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread. Cloning shares the same connection.
#[derive(Clone, Debug)]
pub struct StoreDb {
    pub(crate) conn: Connection,
}

impl StoreDb {
    /// Open a database at the specified path for writing.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .await
            .map_err(|e| Error::StoreUnavailable(format!("{}: {}", path.display(), e)))?;

        Self::prepare(conn).await
    }

    /// Open an existing database without write access.
    ///
    /// Fails if the file does not exist. Migrations are not run, so a store
    /// that was never written to surfaces as query errors on missing tables.
    pub async fn open_read_only(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI;
        let conn = Connection::open_with_flags(path, flags)
            .await
            .map_err(|e| Error::StoreUnavailable(format!("{}: {}", path.display(), e)))?;

        Ok(Self { conn })
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;

        Self::prepare(conn).await
    }

    async fn prepare(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let version = db
            .conn
            .call(|conn| conn.query_row("SELECT sqlite_version()", [], |row| row.get::<_, String>(0)))
            .await
            .unwrap();
        assert!(!version.is_empty());
    }

    #[tokio::test]
    async fn test_open_read_only_missing_file() {
        let result = StoreDb::open_read_only("/nonexistent-standings-dir/standings.sqlite").await;
        assert!(matches!(result, Err(Error::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_open_in_missing_directory_fails() {
        let result = StoreDb::open("/nonexistent-standings-dir/nested/standings.sqlite").await;
        assert!(result.is_err());
    }
}
