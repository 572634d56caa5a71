//! The `lip cache` commands.

use clap::{Args, Subcommand};

use lip::ToothCache;

use crate::error::CliError;

/// Inspect and manage the archive cache.
#[derive(Debug, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// List cached archives with the specifiers they were fetched for.
    List,
    /// Delete every cached archive.
    Purge,
}

pub fn run(args: CacheArgs) -> Result<(), CliError> {
    let context = super::prepare_context()?;
    let cache = ToothCache::new(context.cache_dir());

    match args.command {
        CacheCommand::List => {
            let entries = cache.entries()?;
            if entries.is_empty() {
                println!("Cache is empty.");
                return Ok(());
            }
            for (canonical, path) in entries {
                println!("{canonical}\n    {}", path.display());
            }
        }
        CacheCommand::Purge => {
            let removed = cache.purge()?;
            println!("Removed {removed} cached archives.");
        }
    }
    Ok(())
}
