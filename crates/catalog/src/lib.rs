//! Catalog identifiers and book records.
//!
//! Everything that flows through a scan session is keyed by a
//! [`CatalogIdentifier`]: the product code printed under a book's barcode,
//! canonicalized by [`normalize`] so that `"978-0-13-468599-1"` and
//! `"9780134685991"` are the same key. A successful lookup produces a
//! [`BookRecord`], which is immutable once constructed.

mod identifier;
mod record;

pub use crate::identifier::{CatalogIdentifier, IsbnKind, normalize};
pub use crate::record::{BookRecord, UNKNOWN_AUTHOR};
