//! Scan sessions.
//!
//! A [`ScanController`] owns at most one [`ScanSession`] at a time. Each
//! session has its own [`StagingSet`], fed by an acquisition loop and by
//! manual entry, and ends either by being closed (everything staged is
//! discarded) or by being committed (everything resolved is merged into the
//! library store). Either way the camera is released.

mod controller;
pub mod error;
mod staging;

pub use crate::controller::{ScanController, ScanSession, SessionStatus};
pub use crate::staging::{FetchState, StagingEvent, StagingSet, Submission};
pub use shelfscan_acquire::AcquisitionState;
