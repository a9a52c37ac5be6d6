use crate::chrome::Chrome;
use crate::document::LibraryDocument;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shelfscan_catalog::BookRecord;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Prints the library to PDF through a headless Chrome/Chromium.
pub struct PdfRenderer {
    chrome: Chrome,
    document: LibraryDocument,
    timeout: Duration,
}

impl PdfRenderer {
    /// Fails with [`ErrorKind::ChromeNotFound`] when no Chrome/Chromium is
    /// installed.
    pub fn new() -> Result<Self> {
        Ok(Self {
            chrome: Chrome::discover()?,
            document: LibraryDocument::new()?,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Blocks until Chrome exits; call from a blocking thread in async code.
    #[instrument(skip_all, fields(books = books.len(), output = %save_to.as_ref().display()))]
    pub fn render_to(&self, title: &str, books: &[BookRecord], save_to: impl AsRef<Path>) -> Result<()> {
        let html = self.document.render(title, books)?;
        let mut input = tempfile::Builder::new().suffix(".html").tempfile().or_raise(|| ErrorKind::Io)?;
        input.write_all(html.as_bytes()).or_raise(|| ErrorKind::Io)?;
        input.flush().or_raise(|| ErrorKind::Io)?;
        let save_to = absolute(save_to.as_ref())?;
        self.chrome.print_to_pdf(input.path(), &save_to, self.timeout)?;
        tracing::info!("Library printed to PDF");
        Ok(())
    }
}

// Chrome resolves relative paths against its own working directory.
fn absolute(path: &Path) -> Result<std::path::PathBuf> {
    std::path::absolute(path).or_raise(|| ErrorKind::Io)
}
