//! Path-prefix relations used by possession bookkeeping.
//!
//! Possession entries are path prefixes relative to the workspace. Two teeth
//! may never own overlapping subtrees, and uninstall must only touch paths
//! strictly under the record's prefixes.

use std::path::{Component, Path};

/// Returns true when `ancestor` is a strict ancestor of `path`.
///
/// Comparison is component-wise, so `a` is an ancestor of `a/b` but not of
/// `ab`. A path is not its own ancestor.
pub fn is_ancestor_of(ancestor: &Path, path: &Path) -> bool {
    let a: Vec<Component> = ancestor.components().collect();
    let p: Vec<Component> = path.components().collect();
    a.len() < p.len() && a.iter().zip(p.iter()).all(|(x, y)| x == y)
}

/// Returns true when the two paths name the same location component-wise,
/// ignoring trailing separators.
pub fn is_identical(a: &Path, b: &Path) -> bool {
    a.components().eq(b.components())
}

/// Returns true when two possession prefixes overlap: one is an ancestor of
/// the other, or they are identical.
pub fn prefixes_overlap(a: &Path, b: &Path) -> bool {
    is_identical(a, b) || is_ancestor_of(a, b) || is_ancestor_of(b, a)
}
