//! Library export.
//!
//! Three formats: plain text (one `"{title} by {authors}"` line per book), the
//! same text placed on the system clipboard, and a PDF printed by headless
//! Chrome/Chromium from an HTML page with the same lines under a heading.
//! Exports always read the committed library, never a scan session's staged
//! books.

mod chrome;
mod clipboard;
mod document;
pub mod error;
mod pdf;
mod text;

use crate::error::{Error, ErrorKind};
pub use crate::clipboard::copy_to_clipboard;
pub use crate::document::{DEFAULT_TITLE, LibraryDocument};
pub use crate::pdf::PdfRenderer;
pub use crate::text::to_text;
use derive_more::Display;
use std::str::FromStr;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    #[display("text")]
    Text,
    #[display("pdf")]
    Pdf,
    #[display("clipboard")]
    Clipboard,
}

impl ExportFormat {
    /// `None` for the clipboard, which never writes a file.
    pub fn default_file_name(&self) -> Option<&'static str> {
        match self {
            Self::Text => Some("my-library.txt"),
            Self::Pdf => Some("my-library.pdf"),
            Self::Clipboard => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "pdf" => Ok(Self::Pdf),
            "clipboard" | "clip" => Ok(Self::Clipboard),
            other => exn::bail!(ErrorKind::UnknownFormat(other.to_string())),
        }
    }
}
