//! Lookup Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Every lookup failure means the same thing to the staging set: no record is
//! staged for this attempt. The variants only exist so that logs can tell a
//! missing book apart from a flaky network.

use derive_more::{Display, Error};
use shelfscan_catalog::CatalogIdentifier;

/// A lookup error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for lookup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The lookup completed but nothing matched the identifier.
    #[display("no book found for identifier {_0}")]
    NotFound(#[error(not(source))] CatalogIdentifier),
    /// The endpoint could not be reached, or answered with an error status.
    #[display("network failure looking up identifier {_0}")]
    NetworkFailure(#[error(not(source))] CatalogIdentifier),
    /// The endpoint answered, but not with anything that could become a record.
    #[display("malformed lookup response for identifier {_0}")]
    MalformedResponse(#[error(not(source))] CatalogIdentifier),
    /// The resolver itself could not be constructed.
    #[display("invalid resolver configuration: {_0}")]
    Configuration(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkFailure(_))
    }

    /// The identifier the failed lookup was for, if any.
    pub fn identifier(&self) -> Option<&CatalogIdentifier> {
        match self {
            Self::NotFound(id) | Self::NetworkFailure(id) | Self::MalformedResponse(id) => Some(id),
            Self::Configuration(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfscan_catalog::normalize;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::NotFound(normalize("0000000000000")).to_string(),
            "no book found for identifier 0000000000000"
        );
        assert_eq!(
            ErrorKind::MalformedResponse(normalize("978-0")).to_string(),
            "malformed lookup response for identifier 9780"
        );
    }

    #[test]
    fn error_kind_retryable() {
        assert!(!ErrorKind::NotFound(normalize("1")).is_retryable());
        assert!(!ErrorKind::MalformedResponse(normalize("1")).is_retryable());
        assert!(ErrorKind::NetworkFailure(normalize("1")).is_retryable());
    }
}
