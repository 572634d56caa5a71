//! Iterative dependency resolution.
//!
//! The resolver turns the user's root specifiers into the concrete set of
//! archives to install. It is deliberately a first-match queue walk, not a
//! backtracking solver: specifiers are fetched in FIFO order, each archive's
//! dependencies are resolved against the index, and the first published
//! version satisfying a range is committed. [`select_version`] is the single
//! place that policy lives.

use std::collections::{BTreeSet, VecDeque};
use std::fs;

use semver::Version;
use tracing::{debug, info, warn};

use crate::error::{LipError, LipResult};
use crate::fetch::{Downloader, Fetcher};
use crate::index::VersionIndex;
use crate::options::InstallOptions;
use crate::record::RecordStore;
use crate::specifier::Specifier;
use crate::tooth::ToothFile;
use crate::version::{newer_than, VersionRange};

/// One archive the resolver decided to install.
#[derive(Debug, Clone)]
pub struct ResolvedTooth {
    /// Canonical specifier string the archive was fetched under.
    pub canonical: String,
    /// Whether the specifier was a repository requirement.
    pub requirement: bool,
    /// The opened archive.
    pub tooth: ToothFile,
}

/// The resolver's output: the set of archives to install, keyed by
/// canonical specifier, plus which canonical strings were roots.
#[derive(Debug, Default)]
pub struct Resolution {
    teeth: Vec<ResolvedTooth>,
    roots: BTreeSet<String>,
}

impl Resolution {
    /// The archives to install, in fetch order.
    pub fn teeth(&self) -> &[ResolvedTooth] {
        &self.teeth
    }

    /// True when the canonical specifier was one of the user's roots.
    pub fn is_root(&self, canonical: &str) -> bool {
        self.roots.contains(canonical)
    }

    /// The resolved teeth that were roots, in queue order.
    pub fn root_teeth(&self) -> impl Iterator<Item = &ResolvedTooth> {
        self.teeth.iter().filter(|t| self.roots.contains(&t.canonical))
    }

    fn contains(&self, canonical: &str) -> bool {
        self.teeth.iter().any(|t| t.canonical == canonical)
    }

    #[cfg(test)]
    pub fn push_for_test(&mut self, entry: ResolvedTooth) {
        self.teeth.push(entry);
    }

    #[cfg(test)]
    pub fn mark_root_for_test(&mut self, canonical: &str) {
        self.roots.insert(canonical.to_string());
    }
}

/// Select the version to install: the first entry of `available` (expected
/// newest-first) that satisfies the range; no range accepts the first entry.
///
/// This is the whole selection policy. It intentionally commits to the
/// first match instead of exploring alternatives.
pub fn select_version<'a>(
    range: Option<&VersionRange>,
    available: &'a [Version],
) -> Option<&'a Version> {
    available
        .iter()
        .find(|v| range.map_or(true, |r| r.matches(v)))
}

/// Resolves root specifiers into a [`Resolution`].
pub struct Resolver<'a, D: Downloader, I: VersionIndex> {
    fetcher: &'a Fetcher<'a, D>,
    index: &'a I,
    records: &'a RecordStore,
    options: InstallOptions,
}

impl<'a, D: Downloader, I: VersionIndex> Resolver<'a, D, I> {
    pub fn new(
        fetcher: &'a Fetcher<'a, D>,
        index: &'a I,
        records: &'a RecordStore,
        options: InstallOptions,
    ) -> Self {
        Self {
            fetcher,
            index,
            records,
            options,
        }
    }

    /// Walk the specifier queue until every needed archive is fetched.
    pub fn resolve(&self, root_specifiers: &[Specifier]) -> LipResult<Resolution> {
        let mut resolution = Resolution::default();
        let mut queue: VecDeque<(Specifier, bool)> = root_specifiers
            .iter()
            .map(|s| (s.clone(), true))
            .collect();

        while let Some((specifier, is_root)) = queue.pop_front() {
            let specifier = self.pin(specifier)?;
            let canonical = specifier.to_string();
            if is_root {
                resolution.roots.insert(canonical.clone());
            }
            if resolution.contains(&canonical) {
                continue;
            }

            info!(specifier = %canonical, "fetching");
            let (cache_hit, archive_path) = self.fetcher.fetch(&specifier)?;
            if cache_hit {
                debug!(specifier = %canonical, "served from cache");
            }
            let tooth = ToothFile::open(&archive_path)?;
            let manifest = tooth.manifest();

            // A requirement must receive the tooth it named. The poisoned
            // cache entry is removed so a retry does not trip over it.
            if let Some(expected) = specifier.tooth_path() {
                if manifest.tooth_path != expected {
                    if let Err(e) = fs::remove_file(&archive_path) {
                        warn!(
                            path = %archive_path.display(),
                            "failed to remove the mismatched archive: {e}"
                        );
                    }
                    return Err(LipError::ToothPathMismatch {
                        expected: expected.to_string(),
                        found: manifest.tooth_path.clone(),
                    });
                }
            }

            if let Some(record) = self.records.try_get(&manifest.tooth_path)? {
                let skip = if self.options.force_reinstall {
                    false
                } else if self.options.upgrade {
                    // Skip unless the fetched archive is strictly newer.
                    !newer_than(&manifest.version, &record.version)
                } else {
                    true
                };
                if skip {
                    info!(tooth = %manifest.tooth_path, "already installed");
                    continue;
                }
            }

            if !self.options.no_dependencies {
                for (dep_path, range) in &manifest.dependencies {
                    self.resolve_dependency(dep_path, range, &mut queue)?;
                }
            }

            resolution.teeth.push(ResolvedTooth {
                canonical,
                requirement: specifier.is_requirement(),
                tooth,
            });
        }

        Ok(resolution)
    }

    /// Pin an unversioned requirement to a concrete version via the index.
    fn pin(&self, specifier: Specifier) -> LipResult<Specifier> {
        match &specifier {
            Specifier::Requirement {
                tooth_path,
                version: None,
                range,
            } => {
                let available = self.index.fetch_version_list(tooth_path)?;
                let selected = select_version(range.as_ref(), &available).ok_or_else(|| {
                    LipError::NoMatchingVersion {
                        tooth_path: tooth_path.clone(),
                        range: range
                            .as_ref()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "*".to_string()),
                    }
                })?;
                debug!(tooth = %tooth_path, version = %selected, "pinned");
                Ok(specifier.pinned(selected.clone()))
            }
            _ => Ok(specifier),
        }
    }

    /// Resolve one declared dependency, pushing a pinned requirement onto
    /// the queue unless it is already satisfied by an installed record.
    fn resolve_dependency(
        &self,
        dep_path: &str,
        range: &VersionRange,
        queue: &mut VecDeque<(Specifier, bool)>,
    ) -> LipResult<()> {
        debug!(dependency = %dep_path, range = %range, "resolving dependency");
        let available = self.index.fetch_version_list(dep_path)?;

        // An installed dependency is a hard constraint: it either satisfies
        // the range or the install fails. It is never upgraded in place.
        if let Some(record) = self.records.try_get(dep_path)? {
            if range.matches(&record.version) {
                debug!(
                    dependency = %dep_path,
                    installed = %record.version,
                    "installed version satisfies the requirement"
                );
                return Ok(());
            }
            return Err(LipError::UnsatisfiedInstalledDependency {
                tooth_path: dep_path.to_string(),
                installed: record.version,
                range: range.to_string(),
            });
        }

        let selected =
            select_version(Some(range), &available).ok_or_else(|| LipError::NoMatchingVersion {
                tooth_path: dep_path.to_string(),
                range: range.to_string(),
            })?;
        let dep_specifier = Specifier::Requirement {
            tooth_path: dep_path.to_string(),
            version: Some(selected.clone()),
            range: None,
        };
        queue.push_back((dep_specifier, false));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionMatch;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_select_version_takes_first_match() {
        let available = vec![v("3.0.0"), v("2.5.0"), v("2.0.0"), v("1.0.0")];
        let range = VersionRange::from_clauses(vec![vec![
            VersionMatch::parse(">=2.0.0").unwrap(),
            VersionMatch::parse("<3.0.0").unwrap(),
        ]]);

        let selected = select_version(Some(&range), &available).unwrap();
        assert_eq!(selected, &v("2.5.0"));
    }

    #[test]
    fn test_select_version_without_range_takes_newest() {
        let available = vec![v("2.0.0"), v("1.0.0")];
        assert_eq!(select_version(None, &available).unwrap(), &v("2.0.0"));
    }

    #[test]
    fn test_select_version_none_on_no_match() {
        let available = vec![v("1.0.0")];
        let range = VersionRange::from_clauses(vec![vec![
            VersionMatch::parse(">=2.0.0").unwrap(),
        ]]);
        assert!(select_version(Some(&range), &available).is_none());
    }

    #[test]
    fn test_select_version_empty_list() {
        assert!(select_version(None, &[]).is_none());
    }
}
