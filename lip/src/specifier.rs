//! User-facing tooth specifiers.
//!
//! A specifier names one tooth to install, in one of three forms:
//!
//! - a local `.tth` archive path,
//! - a remote `.tth` archive URL (http or https),
//! - a repository requirement `name[@version-range]`.
//!
//! All downstream consumers switch on the variant. The canonical string form
//! ([`fmt::Display`]) is the cache key and the resolver's dedup key; for a
//! requirement it carries the concrete version once the resolver has pinned
//! one.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use semver::Version;
use url::Url;

use crate::error::{LipError, LipResult};
use crate::version::VersionRange;

/// Archive file extension for teeth.
pub const TOOTH_SUFFIX: &str = ".tth";

/// A parsed tooth specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifier {
    /// An archive on the local filesystem, stored as an absolute path.
    LocalArchive { path: PathBuf },

    /// An archive reachable over http(s).
    RemoteArchive { url: Url },

    /// A repository requirement. `version` is set once a concrete version
    /// has been pinned (by the user writing a bare version, or by the
    /// resolver selecting one); `range` holds the user's constraint.
    Requirement {
        tooth_path: String,
        version: Option<Version>,
        range: Option<VersionRange>,
    },
}

impl Specifier {
    /// Classify and parse a specifier string.
    ///
    /// A `.tth` suffix with an http(s) scheme is a remote archive; a `.tth`
    /// suffix naming an existing file is a local archive; anything else is
    /// interpreted as `name[@version-range]`. Whether the repository name is
    /// actually known to the index is checked by the install pipeline's
    /// validation stage, not here.
    pub fn parse(input: &str) -> LipResult<Self> {
        let invalid = |reason: &str| LipError::InvalidSpecifier {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if input.ends_with(TOOTH_SUFFIX) {
            if let Ok(url) = Url::parse(input) {
                if matches!(url.scheme(), "http" | "https") {
                    return Ok(Self::RemoteArchive { url });
                }
                // A non-http scheme may still be a path with a colon in it;
                // fall through to the filesystem probe.
            }
            let path = fs::canonicalize(input).map_err(|_| {
                invalid("no such archive file and not an http(s) URL")
            })?;
            if !path.is_file() {
                return Err(invalid("archive path does not name a regular file"));
            }
            return Ok(Self::LocalArchive { path });
        }

        let (name, suffix) = match input.split_once('@') {
            Some((name, suffix)) => (name, Some(suffix)),
            None => (input, None),
        };
        validate_tooth_path(name).map_err(|reason| invalid(&reason))?;

        let (version, range) = match suffix {
            None => (None, None),
            Some(s) if s.is_empty() => {
                return Err(invalid("empty version after '@'"));
            }
            Some(s) => match Version::parse(s) {
                // A bare version pins immediately.
                Ok(v) => (Some(v), None),
                Err(_) => (None, Some(VersionRange::parse_clause(s)?)),
            },
        };

        Ok(Self::Requirement {
            tooth_path: name.to_string(),
            version,
            range,
        })
    }

    /// True for the `Requirement` variant.
    pub fn is_requirement(&self) -> bool {
        matches!(self, Self::Requirement { .. })
    }

    /// The tooth path of a requirement, if this is one.
    pub fn tooth_path(&self) -> Option<&str> {
        match self {
            Self::Requirement { tooth_path, .. } => Some(tooth_path),
            _ => None,
        }
    }

    /// Return a copy of this requirement pinned to a concrete version.
    /// Non-requirement specifiers are returned unchanged.
    pub fn pinned(&self, version: Version) -> Self {
        match self {
            Self::Requirement {
                tooth_path, range, ..
            } => Self::Requirement {
                tooth_path: tooth_path.clone(),
                version: Some(version),
                range: range.clone(),
            },
            other => other.clone(),
        }
    }
}

/// The canonical string form: cache key and resolver dedup key.
impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalArchive { path } => write!(f, "{}", path.display()),
            Self::RemoteArchive { url } => write!(f, "{url}"),
            Self::Requirement {
                tooth_path,
                version: Some(v),
                ..
            } => write!(f, "{tooth_path}@{v}"),
            Self::Requirement {
                tooth_path,
                version: None,
                range: Some(range),
            } => write!(f, "{tooth_path}@{range}"),
            Self::Requirement {
                tooth_path,
                version: None,
                range: None,
            } => write!(f, "{tooth_path}"),
        }
    }
}

/// Validate a dotted repository-style tooth path such as `example.com/foo`.
fn validate_tooth_path(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("empty tooth path".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '/'))
    {
        return Err("tooth path contains invalid characters".to_string());
    }
    if name.split('/').any(|segment| segment.is_empty()) {
        return Err("tooth path contains an empty path segment".to_string());
    }
    if !name.split('/').next().unwrap_or("").contains('.') {
        return Err("tooth path must start with a dotted registry domain".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_parse_remote_archive() {
        let spec = Specifier::parse("https://example.com/teeth/foo.tth").unwrap();
        match &spec {
            Specifier::RemoteArchive { url } => {
                assert_eq!(url.scheme(), "https");
            }
            other => panic!("expected RemoteArchive, got {other:?}"),
        }
        assert_eq!(spec.to_string(), "https://example.com/teeth/foo.tth");
    }

    #[test]
    fn test_parse_local_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("foo.tth");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"stub").unwrap();

        let spec = Specifier::parse(path.to_str().unwrap()).unwrap();
        match &spec {
            Specifier::LocalArchive { path } => assert!(path.is_absolute()),
            other => panic!("expected LocalArchive, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_missing_local_archive_fails() {
        assert!(matches!(
            Specifier::parse("/no/such/file.tth"),
            Err(LipError::InvalidSpecifier { .. })
        ));
    }

    #[test]
    fn test_parse_bare_requirement() {
        let spec = Specifier::parse("example.com/foo").unwrap();
        assert_eq!(
            spec,
            Specifier::Requirement {
                tooth_path: "example.com/foo".to_string(),
                version: None,
                range: None,
            }
        );
        assert_eq!(spec.to_string(), "example.com/foo");
    }

    #[test]
    fn test_parse_requirement_with_bare_version_pins() {
        let spec = Specifier::parse("example.com/foo@1.0.0").unwrap();
        match &spec {
            Specifier::Requirement { version, range, .. } => {
                assert_eq!(version.as_ref().unwrap(), &Version::new(1, 0, 0));
                assert!(range.is_none());
            }
            other => panic!("expected Requirement, got {other:?}"),
        }
        assert_eq!(spec.to_string(), "example.com/foo@1.0.0");
    }

    #[test]
    fn test_parse_requirement_with_range() {
        let spec = Specifier::parse("example.com/foo@>=1.0.0,<2.0.0").unwrap();
        match &spec {
            Specifier::Requirement { version, range, .. } => {
                assert!(version.is_none());
                let range = range.as_ref().unwrap();
                assert!(range.matches(&Version::new(1, 5, 0)));
                assert!(!range.matches(&Version::new(2, 0, 0)));
            }
            other => panic!("expected Requirement, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_requirement_exact_operator() {
        let spec = Specifier::parse("example.com/foo@=1.0.0").unwrap();
        match &spec {
            Specifier::Requirement { version, range, .. } => {
                assert!(version.is_none());
                assert!(range.as_ref().unwrap().matches(&Version::new(1, 0, 0)));
            }
            other => panic!("expected Requirement, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_names() {
        for bad in ["", "foo", "example.com//foo", "exa mple.com/foo", "foo@"] {
            assert!(
                Specifier::parse(bad).is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_pinned_produces_canonical_with_version() {
        let spec = Specifier::parse("example.com/foo@>=1.0.0").unwrap();
        let pinned = spec.pinned(Version::new(1, 2, 0));
        assert_eq!(pinned.to_string(), "example.com/foo@1.2.0");
    }

    #[test]
    fn test_identical_strings_share_canonical_form() {
        let a = Specifier::parse("example.com/foo@1.0.0").unwrap();
        let b = Specifier::parse("example.com/foo@1.0.0").unwrap();
        assert_eq!(a.to_string(), b.to_string());
    }
}
