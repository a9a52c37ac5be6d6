//! The staging set: per-session lookup bookkeeping.

use shelfscan_acquire::CandidateSink;
use shelfscan_catalog::{BookRecord, CatalogIdentifier, IsbnKind, normalize};
use shelfscan_resolver::ResolverHandle;
use shelfscan_resolver::error::{ErrorKind as LookupErrorKind, Result as LookupResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, watch};
use tokio::task::AbortHandle;

const EVENT_CAPACITY: usize = 64;

/// Where a single identifier's lookup stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    InFlight,
    Resolved(BookRecord),
    /// The lookup finished without a record. Scanning it again starts a
    /// fresh attempt.
    Absent,
}

/// What [`StagingSet::submit`] did with a raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A lookup was started.
    Started(CatalogIdentifier),
    /// Already being looked up; nothing to do.
    InFlight(CatalogIdentifier),
    /// Already staged; nothing to do.
    Resolved(CatalogIdentifier),
    /// Normalized to nothing.
    Empty,
    /// The set was closed.
    Closed,
}

/// Notifications for front-ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingEvent {
    Submitted(CatalogIdentifier),
    Resolved(BookRecord),
    Absent(CatalogIdentifier),
}

/// Identifiers seen during one scan session and the books resolved for them.
///
/// Each identifier is looked up at most once at a time: submitting it again
/// while its lookup is in flight, or after it resolved, does nothing. Only a
/// lookup that came back empty can be retried, by submitting the identifier
/// again. Checking an identifier's state and marking it in flight happen
/// under one lock, so concurrent submissions of the same identifier (however
/// differently formatted) start exactly one lookup.
///
/// Lookups run as spawned tasks, so [`submit`](Self::submit) never waits for
/// the network and must be called from within a tokio runtime. Handles are
/// cheap to clone and all refer to the same set.
#[derive(Clone)]
pub struct StagingSet {
    shared: Arc<Shared>,
}

struct Shared {
    resolver: ResolverHandle,
    inner: Mutex<Inner>,
    busy: watch::Sender<bool>,
    events: broadcast::Sender<StagingEvent>,
}

#[derive(Default)]
struct Inner {
    states: HashMap<CatalogIdentifier, FetchState>,
    /// Resolved records, in the order their lookups completed.
    resolved: Vec<BookRecord>,
    lookups: HashMap<CatalogIdentifier, AbortHandle>,
    closed: bool,
}

impl Inner {
    fn in_flight(&self) -> usize {
        self.lookups.len()
    }
}

impl StagingSet {
    pub fn new(resolver: ResolverHandle) -> Self {
        let (busy, _) = watch::channel(false);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared { resolver, inner: Mutex::default(), busy, events }),
        }
    }

    /// Submit a raw scanned or typed value.
    pub fn submit(&self, raw: &str) -> Submission {
        let id = normalize(raw);
        if id.is_empty() {
            tracing::debug!(raw, "Rejecting empty identifier");
            return Submission::Empty;
        }
        let mut inner = self.shared.lock();
        if inner.closed {
            return Submission::Closed;
        }
        match inner.states.get(&id) {
            Some(FetchState::InFlight) => return Submission::InFlight(id),
            Some(FetchState::Resolved(_)) => return Submission::Resolved(id),
            Some(FetchState::Absent) | None => {},
        }
        if id.kind() != IsbnKind::Other && !id.has_valid_checksum() {
            // Looked up anyway: the lookup service is the judge of what exists.
            tracing::warn!(%id, "Identifier has an invalid ISBN check digit");
        }
        inner.states.insert(id.clone(), FetchState::InFlight);
        let lookup = tokio::spawn(Shared::resolve(Arc::clone(&self.shared), id.clone()));
        inner.lookups.insert(id.clone(), lookup.abort_handle());
        if inner.in_flight() == 1 {
            self.shared.busy.send_replace(true);
        }
        // Sent under the lock so it always precedes the completion event.
        _ = self.shared.events.send(StagingEvent::Submitted(id.clone()));
        tracing::debug!(%id, "Lookup started");
        Submission::Started(id)
    }

    /// Whether submitting `raw` now would start a lookup.
    pub fn accepts(&self, raw: &str) -> bool {
        let id = normalize(raw);
        if id.is_empty() {
            return false;
        }
        let inner = self.shared.lock();
        !inner.closed && matches!(inner.states.get(&id), None | Some(FetchState::Absent))
    }

    pub fn state(&self, id: &CatalogIdentifier) -> Option<FetchState> {
        self.shared.lock().states.get(id).cloned()
    }

    /// Resolved records, in the order they resolved (not the order they were
    /// scanned).
    pub fn snapshot(&self) -> Vec<BookRecord> {
        self.shared.lock().resolved.clone()
    }

    /// Number of resolved records.
    pub fn len(&self) -> usize {
        self.shared.lock().resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any lookup is in flight.
    pub fn is_busy(&self) -> bool {
        *self.shared.busy.borrow()
    }

    /// Watch the busy flag, e.g. to drive a loading indicator.
    pub fn busy(&self) -> watch::Receiver<bool> {
        self.shared.busy.subscribe()
    }

    /// Wait until no lookup is in flight.
    pub async fn settled(&self) {
        let mut busy = self.busy();
        // Only errors if the sender is gone, which can't happen while `self` lives.
        _ = busy.wait_for(|busy| !busy).await;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StagingEvent> {
        self.shared.events.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    /// Abandon in-flight lookups and forget everything staged.
    ///
    /// Lookups that complete after this are ignored. Returns how many lookups
    /// were abandoned.
    pub fn close(&self) -> usize {
        let mut inner = self.shared.lock();
        if inner.closed {
            return 0;
        }
        inner.closed = true;
        let abandoned = inner.in_flight();
        for (_, lookup) in inner.lookups.drain() {
            lookup.abort();
        }
        inner.states.clear();
        inner.resolved.clear();
        self.shared.busy.send_replace(false);
        if abandoned > 0 {
            tracing::info!(abandoned, "Abandoned in-flight lookups");
        }
        abandoned
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn resolve(shared: Arc<Self>, id: CatalogIdentifier) {
        let outcome = shared.resolver.resolve(&id).await;
        shared.complete(id, outcome);
    }

    fn complete(&self, id: CatalogIdentifier, outcome: LookupResult<BookRecord>) {
        let mut inner = self.lock();
        if inner.closed || inner.lookups.remove(&id).is_none() {
            return;
        }
        let event = match outcome {
            Ok(record) => {
                tracing::info!(%id, title = record.title(), "Staged");
                inner.resolved.push(record.clone());
                inner.states.insert(id, FetchState::Resolved(record.clone()));
                StagingEvent::Resolved(record)
            },
            Err(e) => {
                match &*e {
                    LookupErrorKind::NotFound(_) => tracing::info!(%id, "No book found"),
                    _ => tracing::warn!(%id, resolver = %self.resolver.name(), error = ?e, "Lookup failed"),
                }
                inner.states.insert(id.clone(), FetchState::Absent);
                StagingEvent::Absent(id)
            },
        };
        if inner.in_flight() == 0 {
            self.busy.send_replace(false);
        }
        _ = self.events.send(event);
    }
}

impl CandidateSink for StagingSet {
    fn submit(&self, raw: &str) {
        StagingSet::submit(self, raw);
    }

    fn accepts(&self, raw: &str) -> bool {
        StagingSet::accepts(self, raw)
    }
}
