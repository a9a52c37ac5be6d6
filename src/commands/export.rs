use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shelfscan_config::Config;
use shelfscan_export::{ExportFormat, PdfRenderer, copy_to_clipboard, to_text};
use shelfscan_store::LibraryStore;
use std::path::PathBuf;

pub async fn run(config: &Config, format: ExportFormat, output: Option<PathBuf>) -> Result<()> {
    let store = super::open_library(config).await?;
    let books = store.get().await.or_raise(|| ErrorKind::Store);
    store.close().await;
    let books = books?;

    match format {
        ExportFormat::Text => {
            let text = to_text(&books);
            match output {
                Some(path) => {
                    std::fs::write(&path, text).or_raise(|| ErrorKind::Io)?;
                    eprintln!("Exported {} book(s) to {}", books.len(), path.display());
                },
                None => println!("{text}"),
            }
        },
        ExportFormat::Pdf => {
            let path = output.unwrap_or_else(|| PathBuf::from(format.default_file_name().unwrap_or_default()));
            let title = config.export.title.clone();
            let count = books.len();
            let target = path.clone();
            tokio::task::spawn_blocking(move || PdfRenderer::new()?.render_to(&title, &books, &target))
                .await
                .or_raise(|| ErrorKind::Io)?
                .or_raise(|| ErrorKind::Export)?;
            eprintln!("Exported {count} book(s) to {}", path.display());
        },
        ExportFormat::Clipboard => {
            if let Some(path) = output {
                tracing::warn!(path = %path.display(), "Ignoring output file for clipboard export");
            }
            let count = books.len();
            tokio::task::spawn_blocking(move || copy_to_clipboard(&books))
                .await
                .or_raise(|| ErrorKind::Io)?
                .or_raise(|| ErrorKind::Export)?;
            eprintln!("Copied {count} book(s) to the clipboard");
        },
    }
    Ok(())
}
