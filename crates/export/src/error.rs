//! Export Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An export error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("chrome/chromium not detected on your system")]
    ChromeNotFound,
    #[display("chrome did not finish printing in time")]
    ChromeTimeout,
    /// Chrome exited with a non-zero exit code.
    /// If the exit code is zero, Chrome exited without producing a PDF.
    #[display("Chrome exited with code: {_0}")]
    ChromeFailed(#[error(not(source))] i32),
    #[display("unknown export format: {_0}")]
    UnknownFormat(#[error(not(source))] String),
    #[display("system clipboard unavailable")]
    Clipboard,
    #[display("could not render library document")]
    Template,
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ChromeTimeout)
    }
}
