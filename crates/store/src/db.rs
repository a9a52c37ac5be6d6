//! SQLite pool for the library file.

use exn::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// A commit and a listing at most.
const FILE_CONNECTIONS: u32 = 2;
const BUSY_TIMEOUT: Duration = Duration::from_millis(1500);

/// Where the library lives.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    File(PathBuf),
    /// Every connection to `:memory:` is its own database, so the pool holds
    /// exactly one.
    Memory,
}

impl Location {
    fn options(&self) -> SqliteConnectOptions {
        match self {
            Self::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .busy_timeout(BUSY_TIMEOUT),
            Self::Memory => SqliteConnectOptions::new().filename(":memory:"),
        }
    }

    fn max_connections(&self) -> u32 {
        match self {
            Self::File(_) => FILE_CONNECTIONS,
            Self::Memory => 1,
        }
    }
}

/// Migrated connection pool for one library database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    #[instrument(name = "opening library database", skip_all, fields(location = ?location))]
    async fn open(location: Location) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(location.max_connections())
            .connect_with(location.options())
            .await
            .or_raise(|| ErrorKind::Database)?;
        MIGRATOR.run(&pool).await.or_raise(|| ErrorKind::Migration)?;
        Ok(Self { pool })
    }

    /// Open (creating if needed) the library file, along with any missing
    /// parent directories.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).or_raise(|| ErrorKind::InvalidPath(parent.to_path_buf()))?;
        }
        Self::open(Location::File(path.to_path_buf())).await
    }

    /// A library that disappears with the pool. Used by tests here and in
    /// downstream crates.
    pub async fn connect_in_memory() -> Result<Self> {
        Self::open(Location::Memory).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Waits for outstanding connections, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn test_close() {
        let db = Database::connect_in_memory().await.unwrap();
        assert!(!db.pool().is_closed());
        db.close().await;
        assert!(db.pool().is_closed());
    }

    #[tokio::test]
    async fn test_reopening_keeps_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.sqlite");
        Database::connect(&path).await.unwrap().close().await;
        let db = Database::connect(&path).await.unwrap();
        let (tables,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'books'")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(tables, 1);
        db.close().await;
    }

    #[tokio::test]
    async fn test_file_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::connect(dir.path().join("library.sqlite")).await.unwrap();
        let mode: String = sqlx::query_scalar("PRAGMA journal_mode").fetch_one(db.pool()).await.unwrap();
        assert_eq!(mode, "wal");
        db.close().await;
    }

    #[rstest]
    #[case("synchronous", 1)]
    #[case("busy_timeout", 1500)]
    #[tokio::test]
    async fn test_file_settings(#[case] pragma: &str, #[case] expected: i64) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::connect(dir.path().join("library.sqlite")).await.unwrap();
        let value: i64 = sqlx::query_scalar(&format!("PRAGMA {pragma}")).fetch_one(db.pool()).await.unwrap();
        assert_eq!(value, expected);
        db.close().await;
    }

    #[test]
    fn test_memory_is_single_connection() {
        assert_eq!(Location::Memory.max_connections(), 1);
        assert_eq!(Location::File(PathBuf::from("library.sqlite")).max_connections(), FILE_CONNECTIONS);
    }

    #[tokio::test]
    async fn test_connect_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("library.sqlite");
        let db = Database::connect(&path).await.unwrap();
        db.close().await;
        assert!(path.exists());
    }
}
