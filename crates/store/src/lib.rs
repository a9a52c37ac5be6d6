//! Persistent library store.
//!
//! The library is a collection of [`BookRecord`]s keyed by
//! [`CatalogIdentifier`](shelfscan_catalog::CatalogIdentifier). Merging new
//! records into it follows one rule: **existing entries win**. A record whose
//! identifier is already in the library is dropped, never overwritten, and
//! only genuinely new identifiers are added.
//!
//! [`SqliteStore`] is the persistent implementation; [`ReadOnlyStore`] wraps
//! any store for dry runs, and `MockStore` (feature `mock`) keeps everything
//! in memory for tests.

mod db;
pub mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod models;
mod ro;
mod sqlite;

pub use crate::db::Database;
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::MockStore;
pub use crate::ro::ReadOnlyStore;
pub use crate::sqlite::SqliteStore;
use crate::error::Result;
use async_trait::async_trait;
use shelfscan_catalog::BookRecord;
use std::sync::Arc;

pub type StoreHandle = Arc<dyn LibraryStore + Send + Sync>;

/// Unified interface for library stores.
///
/// # Examples
///
/// ```
/// use shelfscan_catalog::{BookRecord, normalize};
/// use shelfscan_store::{LibraryStore, SqliteStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = SqliteStore::in_memory().await.unwrap();
/// let first = BookRecord::new(normalize("9780134685991"), "Effective Java", ["Joshua Bloch"], None);
/// let again = BookRecord::new(normalize("9780134685991"), "Renamed", ["Someone Else"], None);
///
/// assert_eq!(store.put(&[first.clone()]).await.unwrap(), 1);
/// assert_eq!(store.put(&[again]).await.unwrap(), 0);
/// assert_eq!(store.get().await.unwrap(), vec![first]);
/// # }
/// ```
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Name of the store, for logging only.
    fn name(&self) -> &str;

    /// Every book in the library, in the order they were added.
    async fn get(&self) -> Result<Vec<BookRecord>>;

    /// Merge `records` into the library and return how many were added.
    ///
    /// Records whose identifier already exists in the library are skipped,
    /// as are later duplicates within `records` itself (the first occurrence
    /// wins).
    async fn put(&self, records: &[BookRecord]) -> Result<u64>;
}
