//! The `lip list` command.

use clap::Args;

use lip::RecordStore;

use crate::error::CliError;

/// List installed teeth.
#[derive(Debug, Args)]
pub struct ListArgs {}

pub fn run(_args: ListArgs) -> Result<(), CliError> {
    let context = super::prepare_context()?;
    let records = RecordStore::new(context.record_dir());

    let installed = records.list()?;
    if installed.is_empty() {
        println!("No teeth installed.");
        return Ok(());
    }

    println!("{:<48} {:<16} {}", "Tooth", "Version", "Requested");
    for record in installed {
        println!(
            "{:<48} {:<16} {}",
            record.tooth_path,
            record.version.to_string(),
            if record.manual { "manually" } else { "as dependency" }
        );
    }
    Ok(())
}
