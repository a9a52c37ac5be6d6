//! Book metadata lookup.
//!
//! The [`Resolver`] trait turns a [`CatalogIdentifier`] into a [`BookRecord`]
//! through some external lookup service, classifying every failure as one of
//! the [`ErrorKind`](crate::error::ErrorKind) variants. The shipped
//! implementation is [`GoogleBooksResolver`]; a scriptable `MockResolver` is
//! available behind the `mock` feature for tests in downstream crates.

pub mod error;
mod google;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use crate::google::{DEFAULT_ENDPOINT, GoogleBooksResolver, parse_volumes};
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::MockResolver;
use crate::error::Result;
use async_trait::async_trait;
use shelfscan_catalog::{BookRecord, CatalogIdentifier};
use std::sync::Arc;

pub type ResolverHandle = Arc<dyn Resolver + Send + Sync>;

/// A single metadata lookup provider.
///
/// Implementations must tolerate being called concurrently for distinct
/// identifiers; completions may arrive in any order. Dropping the returned
/// future abandons the lookup.
///
/// # Examples
///
/// ```no_run
/// use shelfscan_catalog::normalize;
/// use shelfscan_resolver::{GoogleBooksResolver, Resolver};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = GoogleBooksResolver::builder().build().map_err(|e| format!("{e:?}"))?;
/// match resolver.resolve(&normalize("978-0-13-468599-1")).await {
///     Ok(book) => println!("{book}"),
///     Err(e) => println!("nothing staged: {}", *e),
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Name of the lookup provider, for logging only.
    fn name(&self) -> &str;

    /// Look up a single identifier.
    ///
    /// Title and authors come verbatim from the first matching result. No
    /// partially populated record is ever returned: anything short of a
    /// complete match is an error.
    async fn resolve(&self, id: &CatalogIdentifier) -> Result<BookRecord>;
}
