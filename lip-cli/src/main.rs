//! lip - command-line interface.
//!
//! This binary parses arguments, bootstraps logging, and dispatches to the
//! command implementations. Exit codes: 0 on success, 1 on any surfaced
//! pipeline error, 2 on usage errors.

use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod error;
mod logging;

use error::CliError;

#[derive(Parser)]
#[command(name = "lip", version, about = "A package manager for teeth", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install teeth from repositories or standalone archives.
    Install(commands::install::InstallArgs),
    /// Uninstall installed teeth.
    Uninstall(commands::uninstall::UninstallArgs),
    /// List installed teeth.
    List(commands::list::ListArgs),
    /// Inspect and manage the archive cache.
    Cache(commands::cache::CacheArgs),
}

fn main() {
    logging::init();

    let cli = Cli::parse();
    let result: Result<(), CliError> = match cli.command {
        Command::Install(args) => commands::install::run(args),
        Command::Uninstall(args) => commands::uninstall::run(args),
        Command::List(args) => commands::list::run(args),
        Command::Cache(args) => commands::cache::run(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        process::exit(err.exit_code());
    }
}
