use crate::error::{ErrorKind, Result};
use crate::text::to_text;
use exn::ResultExt;
use shelfscan_catalog::BookRecord;
use tracing::instrument;

/// Put the text export on the system clipboard.
///
/// Blocks while the platform clipboard is contacted; call from a blocking
/// thread in async code. On X11 the contents only outlive the process when a
/// clipboard manager picks them up.
#[instrument(skip_all, fields(books = books.len()))]
pub fn copy_to_clipboard(books: &[BookRecord]) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().or_raise(|| ErrorKind::Clipboard)?;
    clipboard.set_text(to_text(books)).or_raise(|| ErrorKind::Clipboard)?;
    tracing::info!("Library copied to clipboard");
    Ok(())
}
