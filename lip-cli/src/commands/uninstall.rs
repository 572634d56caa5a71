//! The `lip uninstall` command.

use clap::Args;

use lip::{ConsoleInteraction, InstallOptions, Installer, RecordStore};

use crate::error::CliError;

/// Uninstall installed teeth, removing everything under their possession
/// prefixes.
#[derive(Debug, Args)]
pub struct UninstallArgs {
    /// Tooth paths to uninstall.
    #[arg(value_name = "TOOTH_PATH")]
    pub tooth_paths: Vec<String>,

    /// Assume yes to all prompts and run non-interactively.
    #[arg(short = 'y', long)]
    pub yes: bool,
}

pub fn run(args: UninstallArgs) -> Result<(), CliError> {
    if args.tooth_paths.is_empty() {
        return Err(CliError::Usage(
            "too few arguments: at least one tooth path is required".to_string(),
        ));
    }

    let context = super::prepare_context()?;
    let records = RecordStore::new(context.record_dir());
    let options = InstallOptions {
        assume_yes: args.yes,
        ..Default::default()
    };
    let interaction = ConsoleInteraction;
    let installer = Installer::new(&context, &records, options, &interaction);

    for tooth_path in &args.tooth_paths {
        let record = records.get(tooth_path)?;
        println!("Uninstalling {tooth_path}...");
        installer.uninstall(&record)?;
    }

    println!("Successfully uninstalled all requested teeth.");
    Ok(())
}
