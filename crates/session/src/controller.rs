use crate::error::{ErrorKind, Result};
use crate::staging::{StagingSet, Submission};
use derive_more::Display;
use exn::{OptionExt, ResultExt};
use shelfscan_acquire::{Acquisition, AcquisitionState, CameraHandle, DEFAULT_RESCAN_COOLDOWN, DetectorHandle, Device};
use shelfscan_catalog::BookRecord;
use shelfscan_resolver::ResolverHandle;
use shelfscan_store::StoreHandle;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// One scanning interaction, from open to close or commit.
///
/// Owns the session's [`StagingSet`] and its acquisition loop (and with it,
/// the camera). Dropping a session abandons its lookups and releases the
/// camera.
pub struct ScanSession {
    staging: StagingSet,
    acquisition: Acquisition,
}

impl ScanSession {
    pub fn staging(&self) -> &StagingSet {
        &self.staging
    }

    pub fn acquisition_state(&self) -> AcquisitionState {
        self.acquisition.state()
    }

    /// Submit a typed identifier.
    pub fn submit_manual(&self, text: &str) -> Submission {
        if !self.acquisition.state().accepts_manual_entry() {
            return Submission::Closed;
        }
        self.staging.submit(text)
    }

    async fn teardown(mut self) -> usize {
        self.acquisition.stop().await;
        self.staging.close()
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.staging.close();
    }
}

/// Snapshot of the active session, for status lines.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[display("{acquisition}, {staged} staged{}", if *busy { ", looking up" } else { "" })]
pub struct SessionStatus {
    pub acquisition: AcquisitionState,
    pub busy: bool,
    pub staged: usize,
}

/// Opens, closes and commits scan sessions.
///
/// At most one session is open at a time; opening a new one closes the
/// current one first. A session always starts with an empty staging set.
pub struct ScanController {
    resolver: ResolverHandle,
    store: StoreHandle,
    device: Option<Device>,
    detector: Option<DetectorHandle>,
    rescan_cooldown: Duration,
    session: Option<ScanSession>,
}

impl ScanController {
    /// A controller without a camera: every session is manual entry only.
    pub fn new(resolver: ResolverHandle, store: StoreHandle) -> Self {
        Self {
            resolver,
            store,
            device: None,
            detector: None,
            rescan_cooldown: DEFAULT_RESCAN_COOLDOWN,
            session: None,
        }
    }

    pub fn with_camera(mut self, camera: CameraHandle, detector: DetectorHandle) -> Self {
        self.device = Some(Device::new(camera));
        self.detector = Some(detector);
        self
    }

    pub fn with_rescan_cooldown(mut self, cooldown: Duration) -> Self {
        self.rescan_cooldown = cooldown;
        self
    }

    pub fn session(&self) -> Option<&ScanSession> {
        self.session.as_ref()
    }

    pub fn status(&self) -> Option<SessionStatus> {
        self.session.as_ref().map(|session| SessionStatus {
            acquisition: session.acquisition_state(),
            busy: session.staging.is_busy(),
            staged: session.staging.len(),
        })
    }

    /// Open a new session, closing (and discarding) any active one.
    #[instrument(skip_all)]
    pub async fn open(&mut self) -> &ScanSession {
        if let Some(previous) = self.session.take() {
            let abandoned = previous.teardown().await;
            tracing::info!(abandoned, "Superseded previous scan session");
        }
        let staging = StagingSet::new(Arc::clone(&self.resolver));
        let acquisition = Acquisition::start(
            self.device.as_ref(),
            self.detector.clone(),
            Arc::new(staging.clone()),
            self.rescan_cooldown,
        )
        .await;
        tracing::info!(state = %acquisition.state(), "Scan session opened");
        self.session.insert(ScanSession { staging, acquisition })
    }

    /// Close the active session without saving anything.
    ///
    /// Returns the number of staged books discarded. Closing when no
    /// session is open does nothing.
    #[instrument(skip_all)]
    pub async fn close(&mut self) -> usize {
        let Some(session) = self.session.take() else {
            return 0;
        };
        let discarded = session.staging.len();
        session.teardown().await;
        tracing::info!(discarded, "Scan session closed");
        discarded
    }

    /// Add every staged book to the library and end the session.
    ///
    /// Books still being looked up are not included. If the store refuses
    /// the books, the session stays open with everything it had staged.
    #[instrument(skip_all)]
    pub async fn commit(&mut self) -> Result<Vec<BookRecord>> {
        let session = self.session.as_ref().ok_or_raise(|| ErrorKind::NoSession)?;
        let records = session.staging.snapshot();
        if !records.is_empty() {
            let added = self.store.put(&records).await.or_raise(|| ErrorKind::Commit)?;
            tracing::info!(staged = records.len(), added, store = %self.store.name(), "Committed staged books");
        }
        if let Some(session) = self.session.take() {
            session.teardown().await;
        }
        Ok(records)
    }

    /// Submit a typed identifier to the active session.
    pub fn submit_manual(&self, text: &str) -> Result<Submission> {
        let session = self.session.as_ref().ok_or_raise(|| ErrorKind::NoSession)?;
        Ok(session.submit_manual(text))
    }
}
