//! Version ranges in disjunctive normal form.

use std::fmt;

use semver::Version;
use serde::de::{Deserializer, Error as _};
use serde::Deserialize;

use crate::error::{LipError, LipResult};

use super::matcher::VersionMatch;

/// A version predicate in disjunctive normal form: an OR of AND-clauses of
/// [`VersionMatch`] atoms. The empty range matches every version.
///
/// In a manifest a range is written as nested arrays of match expressions:
///
/// ```json
/// { "dependencies": { "example.com/lib": [[">=1.0.0", "<2.0.0"], ["=0.9.5"]] } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionRange {
    clauses: Vec<Vec<VersionMatch>>,
}

impl VersionRange {
    /// The range that matches every version.
    pub fn any() -> Self {
        Self::default()
    }

    /// A range matching exactly one version.
    pub fn exact(version: Version) -> Self {
        Self {
            clauses: vec![vec![VersionMatch::Equal(version)]],
        }
    }

    /// Build a range from explicit DNF clauses.
    pub fn from_clauses(clauses: Vec<Vec<VersionMatch>>) -> Self {
        Self { clauses }
    }

    /// Parse a single AND-clause of comma-separated match expressions, as
    /// written after `@` in a requirement specifier: `>=1.0.0,<2.0.0`.
    pub fn parse_clause(input: &str) -> LipResult<Self> {
        let clause = input
            .split(',')
            .map(VersionMatch::parse)
            .collect::<LipResult<Vec<_>>>()?;
        if clause.is_empty() {
            return Err(LipError::InvalidVersion {
                input: input.to_string(),
                reason: "empty version range".to_string(),
            });
        }
        Ok(Self {
            clauses: vec![clause],
        })
    }

    /// True when the range carries no clauses and therefore matches all.
    pub fn is_any(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The DNF clauses.
    pub fn clauses(&self) -> &[Vec<VersionMatch>] {
        &self.clauses
    }

    /// Evaluate the DNF: any clause where all matches hold.
    pub fn matches(&self, v: &Version) -> bool {
        self.clauses.is_empty()
            || self
                .clauses
                .iter()
                .any(|clause| clause.iter().all(|m| m.matches(v)))
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return write!(f, "*");
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " or ")?;
            }
            write!(f, "(")?;
            for (j, m) in clause.iter().enumerate() {
                if j > 0 {
                    write!(f, " and ")?;
                }
                write!(f, "{m}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Vec<Vec<String>> = Vec::deserialize(deserializer)?;
        let mut clauses = Vec::with_capacity(raw.len());
        for clause in raw {
            let parsed = clause
                .iter()
                .map(|s| VersionMatch::parse(s))
                .collect::<LipResult<Vec<_>>>()
                .map_err(D::Error::custom)?;
            clauses.push(parsed);
        }
        Ok(Self { clauses })
    }
}
