//! The manifest document read from a tooth archive.

use std::collections::BTreeMap;

use semver::Version;
use serde::Deserialize;

use crate::version::VersionRange;

/// Read-only view of a tooth's `tooth.json`.
///
/// Dependencies map tooth paths to DNF version ranges and deserialize from
/// the nested-array form (`[[">=1.0.0", "<2.0.0"]]`). A `BTreeMap` keeps the
/// iteration order deterministic, which the resolver relies on.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// The repository name this archive claims.
    pub tooth_path: String,

    /// The packaged version.
    pub version: Version,

    /// Tooth path of each dependency, with the acceptable version range.
    #[serde(default)]
    pub dependencies: BTreeMap<String, VersionRange>,

    /// Filesystem path prefixes this tooth owns, used by uninstall.
    #[serde(default)]
    pub possession: Vec<String>,
}

impl Manifest {
    /// Structural validation beyond what serde enforces.
    pub fn validate(&self) -> Result<(), String> {
        if self.tooth_path.is_empty() {
            return Err("manifest is missing a tooth_path".to_string());
        }
        for prefix in &self.possession {
            if prefix.is_empty() {
                return Err("possession contains an empty prefix".to_string());
            }
            if prefix.starts_with('/') || prefix.contains("..") {
                return Err(format!(
                    "possession prefix {prefix:?} must be a relative path inside the workspace"
                ));
            }
        }
        Ok(())
    }
}
