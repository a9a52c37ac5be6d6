mod export;
mod list;
mod scan;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shelfscan_config::Config;
use shelfscan_resolver::{GoogleBooksResolver, ResolverHandle};
use shelfscan_store::SqliteStore;
use std::sync::Arc;

pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(library = %config.library.display(), "Configuration loaded");
    match cli.command {
        Command::Scan { dry_run } => scan::run(&config, dry_run).await,
        Command::List => list::run(&config).await,
        Command::Export { format, output } => export::run(&config, format, output).await,
    }
}

async fn open_library(config: &Config) -> Result<Arc<SqliteStore>> {
    let store = SqliteStore::open(&config.library).await.or_raise(|| ErrorKind::Store)?;
    Ok(Arc::new(store))
}

fn resolver(config: &Config) -> Result<ResolverHandle> {
    let mut builder =
        GoogleBooksResolver::builder().endpoint(&config.lookup.endpoint).timeout(config.lookup.timeout());
    if let Some(user_agent) = &config.lookup.user_agent {
        builder = builder.user_agent(user_agent);
    }
    Ok(Arc::new(builder.build().or_raise(|| ErrorKind::Resolver)?))
}
