//! Atomic version predicates.

use std::cmp::Ordering;
use std::fmt;

use semver::Version;

use crate::error::{LipError, LipResult};

/// A single atomic version predicate.
///
/// `Compatible` is the `~` operator: it matches versions with the same major
/// component (and the same minor component, when the minor was written in
/// the expression) that compare `>=` the base. `~1` accepts any `1.x.y`;
/// `~1.2` and `~1.2.3` pin the minor as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionMatch {
    Equal(Version),
    NotEqual(Version),
    GreaterThan(Version),
    GreaterEq(Version),
    LessThan(Version),
    LessEq(Version),
    Compatible { base: Version, minor_written: bool },
}

impl VersionMatch {
    /// Parse one match expression: an operator prefix followed by a version.
    ///
    /// A bare version is shorthand for `=`. The `~` operator accepts partial
    /// versions (`~1`, `~1.2`); every other operator requires a full triple.
    pub fn parse(input: &str) -> LipResult<Self> {
        let input = input.trim();
        if let Some(rest) = input.strip_prefix("!=") {
            return Ok(Self::NotEqual(parse_full(rest)?));
        }
        if let Some(rest) = input.strip_prefix(">=") {
            return Ok(Self::GreaterEq(parse_full(rest)?));
        }
        if let Some(rest) = input.strip_prefix("<=") {
            return Ok(Self::LessEq(parse_full(rest)?));
        }
        if let Some(rest) = input.strip_prefix('>') {
            return Ok(Self::GreaterThan(parse_full(rest)?));
        }
        if let Some(rest) = input.strip_prefix('<') {
            return Ok(Self::LessThan(parse_full(rest)?));
        }
        if let Some(rest) = input.strip_prefix('=') {
            return Ok(Self::Equal(parse_full(rest)?));
        }
        if let Some(rest) = input.strip_prefix('~') {
            let (base, minor_written) = parse_partial(rest)?;
            return Ok(Self::Compatible {
                base,
                minor_written,
            });
        }
        // Bare version means exact match.
        Ok(Self::Equal(parse_full(input)?))
    }

    /// Apply the predicate, comparing by SemVer precedence.
    pub fn matches(&self, v: &Version) -> bool {
        match self {
            Self::Equal(base) => v.cmp_precedence(base) == Ordering::Equal,
            Self::NotEqual(base) => v.cmp_precedence(base) != Ordering::Equal,
            Self::GreaterThan(base) => v.cmp_precedence(base) == Ordering::Greater,
            Self::GreaterEq(base) => v.cmp_precedence(base) != Ordering::Less,
            Self::LessThan(base) => v.cmp_precedence(base) == Ordering::Less,
            Self::LessEq(base) => v.cmp_precedence(base) != Ordering::Greater,
            Self::Compatible {
                base,
                minor_written,
            } => {
                v.major == base.major
                    && (!minor_written || v.minor == base.minor)
                    && v.cmp_precedence(base) != Ordering::Less
            }
        }
    }
}

impl fmt::Display for VersionMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal(v) => write!(f, "={v}"),
            Self::NotEqual(v) => write!(f, "!={v}"),
            Self::GreaterThan(v) => write!(f, ">{v}"),
            Self::GreaterEq(v) => write!(f, ">={v}"),
            Self::LessThan(v) => write!(f, "<{v}"),
            Self::LessEq(v) => write!(f, "<={v}"),
            Self::Compatible {
                base,
                minor_written,
            } => {
                if *minor_written {
                    write!(f, "~{base}")
                } else {
                    write!(f, "~{}", base.major)
                }
            }
        }
    }
}

fn parse_full(input: &str) -> LipResult<Version> {
    crate::version::parse_version(input.trim())
}

/// Parse a possibly partial version for the `~` operator, reporting whether
/// the minor component was written.
fn parse_partial(input: &str) -> LipResult<(Version, bool)> {
    let input = input.trim();
    if let Ok(v) = Version::parse(input) {
        return Ok((v, true));
    }
    let invalid = || LipError::InvalidVersion {
        input: input.to_string(),
        reason: "expected a version or a major[.minor] prefix".to_string(),
    };
    let mut parts = input.split('.');
    let major: u64 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(invalid)?;
    match parts.next() {
        None => Ok((Version::new(major, 0, 0), false)),
        Some(minor_str) => {
            let minor: u64 = minor_str.parse().map_err(|_| invalid())?;
            if parts.next().is_some() {
                // Three components that did not parse as a full version.
                return Err(invalid());
            }
            Ok((Version::new(major, minor, 0), true))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_operators() {
        assert_eq!(VersionMatch::parse("=1.0.0").unwrap(), VersionMatch::Equal(v("1.0.0")));
        assert_eq!(
            VersionMatch::parse("!=1.0.0").unwrap(),
            VersionMatch::NotEqual(v("1.0.0"))
        );
        assert_eq!(
            VersionMatch::parse(">=2.1.0").unwrap(),
            VersionMatch::GreaterEq(v("2.1.0"))
        );
        assert_eq!(
            VersionMatch::parse("<3.0.0").unwrap(),
            VersionMatch::LessThan(v("3.0.0"))
        );
    }

    #[test]
    fn test_parse_bare_version_is_equal() {
        assert_eq!(
            VersionMatch::parse("1.2.3").unwrap(),
            VersionMatch::Equal(v("1.2.3"))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(VersionMatch::parse(">=banana").is_err());
        assert!(VersionMatch::parse("").is_err());
        assert!(VersionMatch::parse("~a.b").is_err());
    }

    #[test]
    fn test_equal_ignores_build_metadata() {
        let m = VersionMatch::parse("=1.0.0").unwrap();
        assert!(m.matches(&v("1.0.0+build.7")));
    }

    #[test]
    fn test_ordering_operators() {
        let ge = VersionMatch::parse(">=1.5.0").unwrap();
        assert!(ge.matches(&v("1.5.0")));
        assert!(ge.matches(&v("2.0.0")));
        assert!(!ge.matches(&v("1.4.9")));

        let lt = VersionMatch::parse("<2.0.0").unwrap();
        assert!(lt.matches(&v("1.9.9")));
        assert!(!lt.matches(&v("2.0.0")));
        // Pre-release of the bound orders below the bound.
        assert!(lt.matches(&v("2.0.0-rc.1")));
    }

    #[test]
    fn test_compatible_with_minor_written() {
        let m = VersionMatch::parse("~1.2.3").unwrap();
        assert!(m.matches(&v("1.2.3")));
        assert!(m.matches(&v("1.2.9")));
        assert!(!m.matches(&v("1.3.0")));
        assert!(!m.matches(&v("1.2.2")));
        assert!(!m.matches(&v("2.0.0")));
    }

    #[test]
    fn test_compatible_major_only() {
        let m = VersionMatch::parse("~1").unwrap();
        assert_eq!(
            m,
            VersionMatch::Compatible {
                base: Version::new(1, 0, 0),
                minor_written: false
            }
        );
        assert!(m.matches(&v("1.0.0")));
        assert!(m.matches(&v("1.9.0")));
        assert!(!m.matches(&v("2.0.0")));
        assert!(!m.matches(&v("0.9.0")));
    }

    #[test]
    fn test_compatible_partial_minor() {
        let m = VersionMatch::parse("~1.2").unwrap();
        assert!(m.matches(&v("1.2.0")));
        assert!(m.matches(&v("1.2.7")));
        assert!(!m.matches(&v("1.3.0")));
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["=1.0.0", "!=1.0.0", ">1.0.0", ">=1.0.0", "<1.0.0", "<=1.0.0", "~1"] {
            let m = VersionMatch::parse(s).unwrap();
            assert_eq!(m.to_string(), s);
        }
        assert_eq!(VersionMatch::parse("~1.2.3").unwrap().to_string(), "~1.2.3");
    }
}
