//! Install invocation options.

use crate::error::{LipError, LipResult};

/// The policy flags of one `install` invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    /// Upgrade installed teeth to the newest matching version.
    pub upgrade: bool,
    /// Reinstall even when the installed version is up to date.
    pub force_reinstall: bool,
    /// Do not resolve or install dependencies.
    pub no_dependencies: bool,
    /// Assume yes to every prompt and run non-interactively.
    pub assume_yes: bool,
}

impl InstallOptions {
    /// Reject flag combinations that make no sense together.
    pub fn validate(&self) -> LipResult<()> {
        if self.upgrade && self.force_reinstall {
            return Err(LipError::ConflictingFlags);
        }
        Ok(())
    }
}
