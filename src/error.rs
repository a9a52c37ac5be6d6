//! CLI Error Types

use derive_more::{Display, Error};

/// A command error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for commands.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    #[display("library store error")]
    Store,
    #[display("lookup setup error")]
    Resolver,
    #[display("scan session error")]
    Session,
    #[display("export failed")]
    Export,
    #[display("I/O error")]
    Io,
}
