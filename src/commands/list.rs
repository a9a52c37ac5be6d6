use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shelfscan_config::Config;
use shelfscan_export::to_text;
use shelfscan_store::LibraryStore;

pub async fn run(config: &Config) -> Result<()> {
    let store = super::open_library(config).await?;
    let books = store.get().await.or_raise(|| ErrorKind::Store);
    store.close().await;
    let books = books?;
    if books.is_empty() {
        eprintln!("The library is empty.");
    } else {
        println!("{}", to_text(&books));
        eprintln!("{} book(s)", books.len());
    }
    Ok(())
}
