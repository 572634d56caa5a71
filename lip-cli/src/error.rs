//! CLI error type and exit-code policy.

use thiserror::Error;

/// Errors surfaced by the command layer.
#[derive(Debug, Error)]
pub enum CliError {
    /// A pipeline failure, rendered as-is.
    #[error(transparent)]
    Lip(#[from] lip::LipError),

    /// The command line itself was wrong.
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Exit code for this error: 2 for usage problems, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Lip(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_exit_2() {
        assert_eq!(CliError::Usage("too few arguments".into()).exit_code(), 2);
    }

    #[test]
    fn test_pipeline_errors_exit_1() {
        let err = CliError::Lip(lip::LipError::ConflictingFlags);
        assert_eq!(err.exit_code(), 1);
    }
}
