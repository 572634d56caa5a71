//! Version and version-range algebra.
//!
//! Teeth are versioned with SemVer. This module re-exports
//! [`semver::Version`] as the version type and layers the range machinery on
//! top of it: a [`VersionMatch`] is one atomic predicate (`=`, `!=`, `>`,
//! `>=`, `<`, `<=`, `~`), and a [`VersionRange`] is a disjunctive normal
//! form over matches — an OR of AND-clauses. An empty range matches every
//! version.
//!
//! All comparisons follow SemVer *precedence*: build metadata is ignored and
//! pre-release versions order before the corresponding release.

mod matcher;
mod range;

pub use matcher::VersionMatch;
pub use range::VersionRange;

// Re-export the version type for convenience.
pub use semver::Version;

use std::cmp::Ordering;

use crate::error::{LipError, LipResult};

/// Parse a version string, mapping syntax errors to [`LipError::InvalidVersion`].
pub fn parse_version(input: &str) -> LipResult<Version> {
    Version::parse(input).map_err(|e| LipError::InvalidVersion {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// SemVer precedence comparison: build metadata ignored, pre-release before
/// release.
pub fn precedence(a: &Version, b: &Version) -> Ordering {
    a.cmp_precedence(b)
}

/// Returns true when `a` has strictly higher precedence than `b`.
pub fn newer_than(a: &Version, b: &Version) -> bool {
    precedence(a, b) == Ordering::Greater
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        let v = parse_version("1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));

        let v = parse_version("1.0.0-beta.1").unwrap();
        assert_eq!(v.pre.as_str(), "beta.1");
    }

    #[test]
    fn test_parse_version_rejects_garbage() {
        assert!(matches!(
            parse_version("not-a-version"),
            Err(LipError::InvalidVersion { .. })
        ));
        assert!(parse_version("1.2").is_err());
    }

    #[test]
    fn test_precedence_ignores_build_metadata() {
        let a = parse_version("1.0.0+build.1").unwrap();
        let b = parse_version("1.0.0+build.2").unwrap();
        assert_eq!(precedence(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_prerelease_orders_before_release() {
        let pre = parse_version("2.0.0-rc.1").unwrap();
        let rel = parse_version("2.0.0").unwrap();
        assert!(newer_than(&rel, &pre));
        assert!(!newer_than(&pre, &rel));
    }
}
