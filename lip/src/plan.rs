//! Dependency-ordered install planning.
//!
//! The installer walks the returned list front to back, so every tooth must
//! appear after the teeth it depends on. Only dependencies inside the
//! fetched set form edges; installed teeth are already in place and
//! constrain nothing here.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{LipError, LipResult};
use crate::resolve::ResolvedTooth;

/// Topologically sort the fetched set, dependencies first.
///
/// Ties are broken by lexicographic tooth path so the same plan always
/// installs in the same order. A cycle fails with
/// [`LipError::DependencyCycle`].
pub fn sort_teeth(teeth: Vec<ResolvedTooth>) -> LipResult<Vec<ResolvedTooth>> {
    // Index nodes by position; a tooth path may appear more than once when
    // an archive root and a requirement name the same tooth.
    let mut by_path: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, entry) in teeth.iter().enumerate() {
        by_path
            .entry(entry.tooth.manifest().tooth_path.as_str())
            .or_default()
            .push(i);
    }

    // dependents[d] lists nodes that must come after node d.
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); teeth.len()];
    let mut in_degree: Vec<usize> = vec![0; teeth.len()];
    for (i, entry) in teeth.iter().enumerate() {
        for dep_path in entry.tooth.manifest().dependencies.keys() {
            for &dep_index in by_path.get(dep_path.as_str()).into_iter().flatten() {
                dependents[dep_index].push(i);
                in_degree[i] += 1;
            }
        }
    }

    // Kahn's algorithm with a name-ordered ready set for determinism.
    let mut ready: BTreeSet<(&str, usize)> = teeth
        .iter()
        .enumerate()
        .filter(|(i, _)| in_degree[*i] == 0)
        .map(|(i, entry)| (entry.tooth.manifest().tooth_path.as_str(), i))
        .collect();

    let mut order: Vec<usize> = Vec::with_capacity(teeth.len());
    while let Some(&(name, index)) = ready.iter().next() {
        ready.remove(&(name, index));
        order.push(index);
        for &dependent in &dependents[index] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert((
                    teeth[dependent].tooth.manifest().tooth_path.as_str(),
                    dependent,
                ));
            }
        }
    }

    if order.len() != teeth.len() {
        let mut remaining: Vec<String> = teeth
            .iter()
            .enumerate()
            .filter(|(i, _)| !order.contains(i))
            .map(|(_, entry)| entry.tooth.manifest().tooth_path.clone())
            .collect();
        remaining.sort();
        remaining.dedup();
        return Err(LipError::DependencyCycle { remaining });
    }

    debug!(teeth = order.len(), "install order planned");
    let mut slots: Vec<Option<ResolvedTooth>> = teeth.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .map(|i| slots[i].take().expect("each index appears once"))
        .collect())
}
