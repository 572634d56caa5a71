//! Error types for the install pipeline.

use std::io;
use std::path::PathBuf;

use semver::Version;

/// Result type for pipeline operations.
pub type LipResult<T> = Result<T, LipError>;

/// Errors that can occur while resolving, fetching, or installing teeth.
///
/// Every error is fatal to the current invocation: the pipeline does not
/// retry or proceed past a failure. Records written by installs that already
/// completed in the same invocation are left in place.
#[derive(Debug)]
pub enum LipError {
    /// A version string failed to parse.
    InvalidVersion { input: String, reason: String },

    /// A specifier string could not be classified or parsed.
    InvalidSpecifier { input: String, reason: String },

    /// The repository index does not know the requested tooth path.
    UnknownRepository { tooth_path: String, reason: String },

    /// The repository index could not be reached or understood.
    IndexUnavailable { tooth_path: String, reason: String },

    /// An archive could not be obtained into the cache.
    FetchFailed { url: String, reason: String },

    /// An archive is unreadable or carries an invalid manifest.
    CorruptArchive { path: PathBuf, reason: String },

    /// A fetched archive claims a tooth path other than the one requested.
    ToothPathMismatch { expected: String, found: String },

    /// No published version satisfies the requested range.
    NoMatchingVersion { tooth_path: String, range: String },

    /// An installed dependency does not satisfy a new requirement.
    ///
    /// This is a hard conflict: the pipeline never upgrades an installed
    /// dependency to satisfy another tooth.
    UnsatisfiedInstalledDependency {
        tooth_path: String,
        installed: Version,
        range: String,
    },

    /// `--force-reinstall` and `--upgrade` were both given.
    ConflictingFlags,

    /// A destructive step needed confirmation but none could be obtained.
    ConfirmationRequired { tooth_path: String },

    /// No record exists for the given tooth path.
    RecordNotFound { tooth_path: String },

    /// A record file exists but cannot be decoded.
    RecordCorrupt { path: PathBuf, reason: String },

    /// Asset extraction failed; partially extracted assets were removed.
    ExtractFailed { path: PathBuf, reason: String },

    /// Two teeth claim overlapping possession prefixes.
    PossessionConflict {
        tooth_path: String,
        other: String,
        prefix: String,
    },

    /// The fetched set contains a dependency cycle.
    DependencyCycle { remaining: Vec<String> },

    /// An underlying filesystem operation failed.
    Io { path: PathBuf, source: io::Error },
}

impl LipError {
    /// Shorthand for wrapping an I/O failure with the path it touched.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl std::fmt::Display for LipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidVersion { input, reason } => {
                write!(f, "invalid version {input:?}: {reason}")
            }
            Self::InvalidSpecifier { input, reason } => {
                write!(f, "invalid specifier {input:?}: {reason}")
            }
            Self::UnknownRepository { tooth_path, reason } => {
                write!(f, "unknown tooth repository {tooth_path}: {reason}")
            }
            Self::IndexUnavailable { tooth_path, reason } => {
                write!(
                    f,
                    "repository index unavailable for {tooth_path}: {reason}"
                )
            }
            Self::FetchFailed { url, reason } => {
                write!(f, "failed to fetch {url}: {reason}")
            }
            Self::CorruptArchive { path, reason } => {
                write!(f, "corrupt tooth archive {}: {}", path.display(), reason)
            }
            Self::ToothPathMismatch { expected, found } => {
                write!(
                    f,
                    "tooth path of the downloaded archive ({found}) does not match the specifier ({expected})"
                )
            }
            Self::NoMatchingVersion { tooth_path, range } => {
                write!(f, "no version of {tooth_path} matches {range}")
            }
            Self::UnsatisfiedInstalledDependency {
                tooth_path,
                installed,
                range,
            } => {
                write!(
                    f,
                    "installed version of {tooth_path} ({installed}) does not match the requirement {range}"
                )
            }
            Self::ConflictingFlags => {
                write!(
                    f,
                    "the --force-reinstall flag and the --upgrade flag cannot be used together"
                )
            }
            Self::ConfirmationRequired { tooth_path } => {
                write!(
                    f,
                    "removing {tooth_path} requires confirmation; re-run with --yes"
                )
            }
            Self::RecordNotFound { tooth_path } => {
                write!(f, "{tooth_path} is not installed")
            }
            Self::RecordCorrupt { path, reason } => {
                write!(f, "corrupt record file {}: {}", path.display(), reason)
            }
            Self::ExtractFailed { path, reason } => {
                write!(f, "failed to extract {}: {}", path.display(), reason)
            }
            Self::PossessionConflict {
                tooth_path,
                other,
                prefix,
            } => {
                write!(
                    f,
                    "{tooth_path} claims possession of {prefix}, which overlaps with {other}"
                )
            }
            Self::DependencyCycle { remaining } => {
                write!(f, "dependency cycle among: {}", remaining.join(", "))
            }
            Self::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LipError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_tooth_path_mismatch() {
        let err = LipError::ToothPathMismatch {
            expected: "example.com/alpha".to_string(),
            found: "example.com/beta".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("example.com/alpha"));
        assert!(msg.contains("example.com/beta"));
    }

    #[test]
    fn test_display_conflicting_flags() {
        let msg = LipError::ConflictingFlags.to_string();
        assert!(msg.contains("--force-reinstall"));
        assert!(msg.contains("--upgrade"));
    }

    #[test]
    fn test_io_source_is_preserved() {
        let err = LipError::io(
            "/tmp/x",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
