use crate::error::Result;
use crate::{LibraryStore, StoreHandle};
use async_trait::async_trait;
use shelfscan_catalog::BookRecord;

/// Read-only wrapper around any store.
///
/// Reads are delegated; writes are logged and silently discarded.
pub struct ReadOnlyStore {
    inner: StoreHandle,
}

impl ReadOnlyStore {
    pub fn new(inner: StoreHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LibraryStore for ReadOnlyStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn get(&self) -> Result<Vec<BookRecord>> {
        self.inner.get().await
    }

    async fn put(&self, records: &[BookRecord]) -> Result<u64> {
        tracing::info!(store = %self.inner.name(), records = records.len(), "Dry run, not writing to library");
        Ok(0)
    }
}
