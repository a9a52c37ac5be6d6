//! Scriptable resolver for testing.

use crate::Resolver;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use shelfscan_catalog::{BookRecord, CatalogIdentifier, normalize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Semaphore;

type Outcome = std::result::Result<BookRecord, ErrorKind>;

/// In-memory resolver for testing.
///
/// Identifiers resolve to whatever was registered for them (a record or a
/// failure) and to [`NotFound`](ErrorKind::NotFound) otherwise. Every call is
/// counted, and individual identifiers can be *held* so that their lookups
/// only complete when the test [releases](Self::release) them, which makes
/// completion order deterministic.
///
/// # Examples
///
/// ```
/// use shelfscan_catalog::{BookRecord, normalize};
/// use shelfscan_resolver::{MockResolver, Resolver};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let resolver = MockResolver::with_records([
///     BookRecord::new(normalize("9780134685991"), "Effective Java", ["Joshua Bloch"], None),
/// ]);
/// let book = resolver.resolve(&normalize("978-0-13-468599-1")).await.unwrap();
/// assert_eq!(book.title(), "Effective Java");
/// assert!(resolver.resolve(&normalize("0000000000000")).await.is_err());
/// assert_eq!(resolver.total_calls(), 2);
/// # }
/// ```
pub struct MockResolver {
    name: String,
    outcomes: Mutex<HashMap<CatalogIdentifier, Outcome>>,
    calls: Mutex<HashMap<CatalogIdentifier, usize>>,
    gates: Mutex<HashMap<CatalogIdentifier, Arc<Semaphore>>>,
}

impl MockResolver {
    pub fn with_records(records: impl IntoIterator<Item = BookRecord>) -> Self {
        let outcomes = records.into_iter().map(|record| (record.identifier().clone(), Ok(record))).collect();
        Self {
            name: "mock".to_string(),
            outcomes: Mutex::new(outcomes),
            calls: Mutex::default(),
            gates: Mutex::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Register (or replace) the record returned for its identifier.
    pub fn insert(&self, record: BookRecord) {
        lock(&self.outcomes).insert(record.identifier().clone(), Ok(record));
    }

    /// Make lookups of `raw` fail with `kind`.
    pub fn fail(&self, raw: &str, kind: ErrorKind) {
        lock(&self.outcomes).insert(normalize(raw), Err(kind));
    }

    /// Hold lookups of `raw` until [`release`](Self::release) is called.
    pub fn hold(&self, raw: &str) {
        lock(&self.gates).entry(normalize(raw)).or_insert_with(|| Arc::new(Semaphore::new(0)));
    }

    /// Let exactly one held lookup of `raw` complete.
    ///
    /// A release that happens before the lookup starts is remembered.
    pub fn release(&self, raw: &str) {
        if let Some(gate) = lock(&self.gates).get(&normalize(raw)) {
            gate.add_permits(1);
        }
    }

    /// Number of lookups started for `raw`.
    pub fn calls(&self, raw: &str) -> usize {
        lock(&self.calls).get(&normalize(raw)).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }
}
impl Default for MockResolver {
    fn default() -> Self {
        Self::with_records([])
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    // A panicking test thread shouldn't cascade into every other assertion.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Resolver for MockResolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, id: &CatalogIdentifier) -> Result<BookRecord> {
        *lock(&self.calls).entry(id.clone()).or_default() += 1;
        let gate = lock(&self.gates).get(id).cloned();
        if let Some(gate) = gate
            && let Ok(permit) = gate.acquire().await
        {
            permit.forget();
        }
        let outcome = lock(&self.outcomes).get(id).cloned();
        match outcome {
            Some(Ok(record)) => Ok(record),
            Some(Err(kind)) => Err(exn::Exn::from(kind)),
            None => Err(exn::Exn::from(ErrorKind::NotFound(id.clone()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn effective_java() -> BookRecord {
        BookRecord::new(normalize("9780134685991"), "Effective Java", ["Joshua Bloch"], None)
    }

    #[tokio::test]
    async fn test_resolves_registered_record() {
        let resolver = MockResolver::with_records([effective_java()]);
        let record = resolver.resolve(&normalize("978-0-13-468599-1")).await.unwrap();
        assert_eq!(record, effective_java());
        assert_eq!(resolver.calls("9780134685991"), 1);
    }

    #[tokio::test]
    async fn test_unknown_is_not_found() {
        let resolver = MockResolver::default();
        let err = resolver.resolve(&normalize("0000000000000")).await.unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound(normalize("0000000000000")));
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let resolver = MockResolver::default();
        resolver.fail("1", ErrorKind::NetworkFailure(normalize("1")));
        let err = resolver.resolve(&normalize("1")).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_insert_after_failure() {
        let resolver = MockResolver::default();
        assert!(resolver.resolve(&normalize("9780134685991")).await.is_err());
        resolver.insert(effective_java());
        assert!(resolver.resolve(&normalize("9780134685991")).await.is_ok());
        assert_eq!(resolver.calls("9780134685991"), 2);
    }

    #[tokio::test]
    async fn test_hold_and_release() {
        let resolver = Arc::new(MockResolver::with_records([effective_java()]));
        resolver.hold("9780134685991");
        let task = tokio::spawn({
            let resolver = Arc::clone(&resolver);
            async move { resolver.resolve(&normalize("9780134685991")).await.map(|r| r.title().to_string()) }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!task.is_finished());
        assert_eq!(resolver.calls("9780134685991"), 1);
        resolver.release("9780134685991");
        assert_eq!(task.await.unwrap().unwrap(), "Effective Java");
    }

    #[tokio::test]
    async fn test_release_before_lookup_is_remembered() {
        let resolver = MockResolver::with_records([effective_java()]);
        resolver.hold("9780134685991");
        resolver.release("9780134685991");
        assert!(resolver.resolve(&normalize("9780134685991")).await.is_ok());
    }
}
