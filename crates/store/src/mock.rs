//! In-memory store for testing.

use crate::LibraryStore;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use shelfscan_catalog::BookRecord;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory library with the same merge policy as [`SqliteStore`](crate::SqliteStore).
///
/// Writes can be made to fail on demand to exercise commit error paths.
#[derive(Default)]
pub struct MockStore {
    books: RwLock<Vec<BookRecord>>,
    failing: AtomicBool,
    puts: AtomicUsize,
}

impl MockStore {
    pub fn with_books(books: impl IntoIterator<Item = BookRecord>) -> Self {
        Self {
            books: RwLock::new(books.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Make every subsequent `put` fail with a database error (or stop failing).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `put` calls made, successful or not.
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Vec<BookRecord> {
        self.books.read().await.clone()
    }
}

#[async_trait]
impl LibraryStore for MockStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get(&self) -> Result<Vec<BookRecord>> {
        Ok(self.books.read().await.clone())
    }

    async fn put(&self, records: &[BookRecord]) -> Result<u64> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::Database);
        }
        let mut books = self.books.write().await;
        let mut added = 0;
        for record in records {
            if !books.iter().any(|b| b.identifier() == record.identifier()) {
                books.push(record.clone());
                added += 1;
            }
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscan_catalog::normalize;

    #[tokio::test]
    async fn test_merge_policy() {
        let store = MockStore::with_books([BookRecord::new(normalize("1"), "Original", ["A"], None)]);
        let added = store
            .put(&[
                BookRecord::new(normalize("1"), "Replacement", ["A"], None),
                BookRecord::new(normalize("2"), "New", ["B"], None),
                BookRecord::new(normalize("2"), "Duplicate", ["B"], None),
            ])
            .await
            .unwrap();
        assert_eq!(added, 1);
        let titles: Vec<_> = store.snapshot().await.iter().map(|b| b.title().to_string()).collect();
        assert_eq!(titles, ["Original", "New"]);
    }

    #[tokio::test]
    async fn test_failing_put() {
        let store = MockStore::default();
        store.set_failing(true);
        let err = store.put(&[BookRecord::new(normalize("1"), "T", ["A"], None)]).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(store.snapshot().await.is_empty());
        assert_eq!(store.puts(), 1);
    }
}
