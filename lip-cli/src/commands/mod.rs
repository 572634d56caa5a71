//! Command implementations.
//!
//! Each command builds its collaborators from the discovered [`Context`]
//! and delegates the actual work to the library; this layer owns argument
//! shapes, narration, and prompts.

pub mod cache;
pub mod install;
pub mod list;
pub mod uninstall;

use lip::Context;

use crate::error::CliError;

/// Discover and initialize the filesystem context shared by all commands.
fn prepare_context() -> Result<Context, CliError> {
    let context = Context::discover()?;
    context.init()?;
    Ok(context)
}
