//! The `lip install` command.

use std::io::IsTerminal;

use clap::Args;
use tracing::debug;

use lip::plan::sort_teeth;
use lip::{
    ConsoleInteraction, Fetcher, HttpDownloader, HttpVersionIndex, InstallOptions, Installer,
    ProgressStyle, RecordStore, Resolver, Specifier, ToothCache, VersionIndex,
};

use crate::error::CliError;

/// Install teeth from repositories or from local or remote standalone
/// archives (with suffix `.tth`).
#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Teeth to install: `name[@version-range]` or a `.tth` path or URL.
    #[arg(value_name = "SPECIFIER")]
    pub specifiers: Vec<String>,

    /// Upgrade the specified teeth to the newest available version.
    #[arg(long)]
    pub upgrade: bool,

    /// Reinstall the teeth even if they are already up to date.
    #[arg(long)]
    pub force_reinstall: bool,

    /// Assume yes to all prompts and run non-interactively.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Show numeric progress instead of a progress bar.
    #[arg(long)]
    pub numeric_progress: bool,

    /// Do not install dependencies.
    #[arg(long)]
    pub no_dependencies: bool,
}

pub fn run(args: InstallArgs) -> Result<(), CliError> {
    if args.specifiers.is_empty() {
        return Err(CliError::Usage(
            "too few arguments: at least one specifier is required".to_string(),
        ));
    }

    let options = InstallOptions {
        upgrade: args.upgrade,
        force_reinstall: args.force_reinstall,
        no_dependencies: args.no_dependencies,
        assume_yes: args.yes,
    };
    // Flag conflicts are rejected before anything touches the filesystem.
    options.validate()?;

    let context = super::prepare_context()?;
    let cache = ToothCache::new(context.cache_dir());
    let records = RecordStore::new(context.record_dir());
    let index = HttpVersionIndex::new(context.index_url());
    let downloader = HttpDownloader::new();
    let style = progress_style(args.numeric_progress);
    let fetcher = Fetcher::new(&cache, &downloader, context.index_url(), style);

    println!("Validating specifiers...");
    let mut specifiers = Vec::with_capacity(args.specifiers.len());
    for raw in &args.specifiers {
        println!("  Validating {raw}...");
        let specifier = Specifier::parse(raw).map_err(CliError::Lip)?;
        if let Some(tooth_path) = specifier.tooth_path() {
            index.probe(tooth_path).map_err(CliError::Lip)?;
        }
        specifiers.push(specifier);
    }

    println!("Resolving dependencies and downloading teeth...");
    let resolver = Resolver::new(&fetcher, &index, &records, options);
    let resolution = resolver.resolve(&specifiers)?;
    debug!(teeth = resolution.teeth().len(), "resolution complete");

    let interaction = ConsoleInteraction;
    let installer = Installer::new(&context, &records, options, &interaction);
    installer.transition(&resolution)?;

    println!("Installing teeth...");
    let plan = sort_teeth(resolution.teeth().to_vec())?;
    let installed = installer.install_all(&plan, &resolution)?;
    for tooth_path in &installed {
        println!("  Installed {tooth_path}.");
    }

    println!("Successfully installed all requested teeth.");
    Ok(())
}

fn progress_style(numeric: bool) -> ProgressStyle {
    if numeric {
        ProgressStyle::PercentageOnly
    } else if std::io::stdout().is_terminal() {
        ProgressStyle::Default
    } else {
        ProgressStyle::None
    }
}
