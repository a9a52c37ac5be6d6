//! Session Error Types

use derive_more::{Display, Error};

/// A session error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The operation needs an open scan session.
    #[display("no scan session is open")]
    NoSession,
    /// The library store rejected the staged books. The session is still
    /// open with everything it had staged.
    #[display("could not commit staged books to the library")]
    Commit,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Commit)
    }
}
