use crate::LibraryStore;
use crate::db::Database;
use crate::error::{ErrorKind, Result};
use crate::models::BookRow;
use async_trait::async_trait;
use exn::ResultExt;
use shelfscan_catalog::BookRecord;
use std::path::Path;
use tracing::instrument;

/// Library persisted in a single SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    name: String,
    db: Database,
}

impl SqliteStore {
    pub fn new(name: impl Into<String>, db: Database) -> Self {
        Self { name: name.into(), db }
    }

    /// Open (creating if necessary) the library at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = Database::connect(path).await?;
        Ok(Self::new(path.display().to_string(), db))
    }

    /// A throwaway library that lives only as long as this store.
    pub async fn in_memory() -> Result<Self> {
        Ok(Self::new(":memory:", Database::connect_in_memory().await?))
    }

    pub async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as(include_str!("../queries/count_books.sql"))
            .fetch_one(self.db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("book count"))
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}

#[async_trait]
impl LibraryStore for SqliteStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self) -> Result<Vec<BookRecord>> {
        let rows: Vec<BookRow> = sqlx::query_as(include_str!("../queries/list_books.sql"))
            .fetch_all(self.db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(BookRecord::try_from).collect()
    }

    #[instrument(skip_all, fields(store = %self.name, records = records.len()))]
    async fn put(&self, records: &[BookRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }
        let rows = records.iter().map(BookRow::try_from).collect::<Result<Vec<_>>>()?;
        let mut tx = self.db.pool().begin().await.or_raise(|| ErrorKind::Database)?;
        let mut added = 0;
        for row in rows {
            let result = sqlx::query(include_str!("../queries/insert_book.sql"))
                .bind(&row.identifier)
                .bind(&row.title)
                .bind(&row.authors)
                .bind(&row.cover_url)
                .bind(row.added_at)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
            if result.rows_affected() == 0 {
                tracing::debug!(id = %row.identifier, "Already in library, keeping existing entry");
            }
            added += result.rows_affected();
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        tracing::info!(added, "Merged books into library");
        Ok(added)
    }
}
