//! Acquisition Error Types
//!
//! None of these are fatal to a scan session: a camera that can't be opened
//! leaves manual entry available, and a frame that can't be decoded is simply
//! skipped.

use derive_more::{Display, Error};

/// An acquisition error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for acquisition operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why the camera could not be used.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum CameraFault {
    #[display("permission denied")]
    PermissionDenied,
    #[display("no camera device")]
    NoDevice,
    #[display("camera is in use")]
    Busy,
}

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("camera unavailable: {_0}")]
    CameraUnavailable(#[error(not(source))] CameraFault),
    /// Reading the next frame from an open camera failed.
    #[display("could not read camera frame")]
    Frame,
    /// A frame was read but the detector could not decode it.
    #[display("could not decode barcode from frame")]
    Detection,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::CameraUnavailable(fault) => *fault == CameraFault::Busy,
            Self::Frame | Self::Detection => true,
        }
    }
}
