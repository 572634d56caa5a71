//! Applying an install plan to the workspace.
//!
//! The installer runs two passes. The transition pass handles
//! `--force-reinstall` and `--upgrade`: requirement roots whose tooth is
//! already installed are uninstalled first (unconditionally under force,
//! only for a strictly newer fetched version under upgrade). The main pass
//! walks the planner's order, extracts each tooth's assets into the
//! workspace, and writes its record. Teeth that already have a record are
//! skipped, which makes the pass idempotent.
//!
//! Uninstall is destructive: it removes everything under the record's
//! possession prefixes. Without `--yes` it asks for confirmation, and in a
//! non-interactive context it refuses instead of guessing.

use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::context::Context;
use crate::error::{LipError, LipResult};
use crate::options::InstallOptions;
use crate::paths::prefixes_overlap;
use crate::record::{Record, RecordStore};
use crate::resolve::{Resolution, ResolvedTooth};
use crate::version::newer_than;

/// Answers the destructive-action prompt.
///
/// The production implementation asks on the controlling terminal; tests
/// substitute canned answers.
pub trait Interaction {
    /// Ask the user to confirm. `Ok(false)` aborts politely; an error means
    /// no answer could be obtained at all.
    fn confirm(&self, prompt: &str) -> io::Result<bool>;
}

/// Prompts on stdin/stdout when they are a terminal.
#[derive(Debug, Default)]
pub struct ConsoleInteraction;

impl Interaction for ConsoleInteraction {
    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        if !io::stdin().is_terminal() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "stdin is not a terminal",
            ));
        }
        print!("{prompt} [y/N] ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
    }
}

/// Applies resolutions to the workspace record store.
pub struct Installer<'a> {
    context: &'a Context,
    records: &'a RecordStore,
    options: InstallOptions,
    interaction: &'a dyn Interaction,
}

impl<'a> Installer<'a> {
    pub fn new(
        context: &'a Context,
        records: &'a RecordStore,
        options: InstallOptions,
        interaction: &'a dyn Interaction,
    ) -> Self {
        Self {
            context,
            records,
            options,
            interaction,
        }
    }

    /// The upgrade/reinstall transition: uninstall records superseded by
    /// requirement roots in the resolution.
    ///
    /// Archive roots (local or remote `.tth` specifiers) are excluded and
    /// treated as fresh installs even when a same-named record exists.
    pub fn transition(&self, resolution: &Resolution) -> LipResult<()> {
        self.options.validate()?;
        if !self.options.force_reinstall && !self.options.upgrade {
            return Ok(());
        }

        for entry in resolution.root_teeth() {
            if !entry.requirement {
                warn!(
                    specifier = %entry.canonical,
                    "archive specifiers are not considered for upgrade or reinstall"
                );
                continue;
            }
            let manifest = entry.tooth.manifest();
            let Some(record) = self.records.try_get(&manifest.tooth_path)? else {
                continue;
            };
            if !self.options.force_reinstall
                && !newer_than(&manifest.version, &record.version)
            {
                continue;
            }
            info!(
                tooth = %record.tooth_path,
                version = %record.version,
                "uninstalling before reinstall"
            );
            self.uninstall(&record)?;
        }
        Ok(())
    }

    /// Remove an installed tooth: every file under its possession prefixes,
    /// then the record itself.
    pub fn uninstall(&self, record: &Record) -> LipResult<()> {
        self.confirm_removal(record)?;

        for prefix in &record.possession {
            let target = self.context.workspace().join(prefix);
            if target.is_dir() {
                fs::remove_dir_all(&target).map_err(|e| LipError::io(&target, e))?;
            } else if target.is_file() {
                fs::remove_file(&target).map_err(|e| LipError::io(&target, e))?;
            }
        }
        self.records.remove(&record.tooth_path)?;
        info!(tooth = %record.tooth_path, "uninstalled");
        Ok(())
    }

    /// Install the planned teeth in order. Returns the tooth paths actually
    /// installed (already-installed entries are skipped).
    pub fn install_all(
        &self,
        plan: &[ResolvedTooth],
        resolution: &Resolution,
    ) -> LipResult<Vec<String>> {
        let mut installed = Vec::new();
        for entry in plan {
            let manifest = entry.tooth.manifest();
            if self.records.is_installed(&manifest.tooth_path) {
                info!(tooth = %manifest.tooth_path, "already installed, skipping");
                continue;
            }
            self.check_possession(manifest.tooth_path.as_str(), &manifest.possession)?;

            info!(
                tooth = %manifest.tooth_path,
                version = %manifest.version,
                "installing"
            );
            let created = entry.tooth.extract_assets(self.context.workspace())?;

            let record = Record::from_tooth(&entry.tooth, resolution.is_root(&entry.canonical));
            if let Err(e) = self.records.put(&record) {
                // The extracted tree must not outlive a failed record write.
                for path in &created {
                    fs::remove_file(path).ok();
                }
                return Err(e);
            }
            installed.push(manifest.tooth_path.clone());
        }
        Ok(installed)
    }

    /// Reject possession that overlaps any other installed tooth's.
    fn check_possession(&self, tooth_path: &str, possession: &[String]) -> LipResult<()> {
        let existing = self.records.list()?;
        for record in &existing {
            if record.tooth_path == tooth_path {
                continue;
            }
            for theirs in &record.possession {
                for ours in possession {
                    if prefixes_overlap(Path::new(ours), Path::new(theirs)) {
                        return Err(LipError::PossessionConflict {
                            tooth_path: tooth_path.to_string(),
                            other: record.tooth_path.clone(),
                            prefix: ours.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn confirm_removal(&self, record: &Record) -> LipResult<()> {
        if self.options.assume_yes {
            return Ok(());
        }
        let prompt = format!(
            "About to remove {} and everything under: {}. Continue?",
            record.tooth_path,
            record.possession.join(", ")
        );
        match self.interaction.confirm(&prompt) {
            Ok(true) => Ok(()),
            _ => Err(LipError::ConfirmationRequired {
                tooth_path: record.tooth_path.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    use semver::Version;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use crate::tooth::{ToothFile, MANIFEST_NAME};

    /// Always refuses, as a non-interactive context would.
    struct Refuse;

    impl Interaction for Refuse {
        fn confirm(&self, _prompt: &str) -> io::Result<bool> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "no terminal"))
        }
    }

    struct Fixture {
        _home: TempDir,
        _work: TempDir,
        context: Context,
        records: RecordStore,
        archives: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let home = TempDir::new().unwrap();
            let work = TempDir::new().unwrap();
            let context = Context::new(home.path(), work.path(), "https://idx");
            context.init().unwrap();
            let records = RecordStore::new(context.record_dir());
            Self {
                _home: home,
                _work: work,
                context,
                records,
                archives: TempDir::new().unwrap(),
            }
        }

        fn installer<'a>(
            &'a self,
            options: InstallOptions,
            interaction: &'a dyn Interaction,
        ) -> Installer<'a> {
            Installer::new(&self.context, &self.records, options, interaction)
        }

        fn tooth(&self, name: &str, version: &str) -> ResolvedTooth {
            let manifest = format!(
                r#"{{
                    "tooth_path": "example.com/{name}",
                    "version": "{version}",
                    "possession": ["plugins/{name}/"]
                }}"#
            );
            let path = self.archives.path().join(format!("{name}-{version}.tth"));
            let mut writer = ZipWriter::new(File::create(&path).unwrap());
            let options = SimpleFileOptions::default();
            writer.start_file(MANIFEST_NAME, options).unwrap();
            writer.write_all(manifest.as_bytes()).unwrap();
            writer
                .start_file(format!("plugins/{name}/payload.bin"), options)
                .unwrap();
            writer.write_all(version.as_bytes()).unwrap();
            writer.finish().unwrap();

            ResolvedTooth {
                canonical: format!("example.com/{name}@{version}"),
                requirement: true,
                tooth: ToothFile::open(&path).unwrap(),
            }
        }

        fn resolution_of(&self, teeth: Vec<ResolvedTooth>, roots: &[&str]) -> Resolution {
            let mut resolution = Resolution::default();
            for t in teeth {
                resolution.push_for_test(t);
            }
            for r in roots {
                resolution.mark_root_for_test(r);
            }
            resolution
        }
    }

    #[test]
    fn test_install_writes_assets_and_record() {
        let fx = Fixture::new();
        let installer = fx.installer(InstallOptions::default(), &Refuse);
        let entry = fx.tooth("foo", "1.0.0");
        let resolution =
            fx.resolution_of(vec![entry.clone()], &["example.com/foo@1.0.0"]);

        let installed = installer
            .install_all(resolution.teeth(), &resolution)
            .unwrap();

        assert_eq!(installed, vec!["example.com/foo"]);
        assert!(fx
            .context
            .workspace()
            .join("plugins/foo/payload.bin")
            .is_file());
        let record = fx.records.get("example.com/foo").unwrap();
        assert_eq!(record.version, Version::new(1, 0, 0));
        assert!(record.manual);
    }

    #[test]
    fn test_dependency_record_is_not_manual() {
        let fx = Fixture::new();
        let installer = fx.installer(InstallOptions::default(), &Refuse);
        let entry = fx.tooth("lib", "1.0.0");
        let resolution = fx.resolution_of(vec![entry], &[]);

        installer
            .install_all(resolution.teeth(), &resolution)
            .unwrap();

        assert!(!fx.records.get("example.com/lib").unwrap().manual);
    }

    #[test]
    fn test_install_skips_already_installed() {
        let fx = Fixture::new();
        let installer = fx.installer(InstallOptions::default(), &Refuse);
        let entry = fx.tooth("foo", "1.0.0");
        fx.records
            .put(&Record::from_tooth(&entry.tooth, true))
            .unwrap();
        let resolution = fx.resolution_of(vec![entry], &[]);

        let installed = installer
            .install_all(resolution.teeth(), &resolution)
            .unwrap();

        assert!(installed.is_empty());
        // Nothing was extracted for the skipped tooth.
        assert!(!fx.context.workspace().join("plugins/foo").exists());
    }

    #[test]
    fn test_possession_conflict_is_rejected() {
        let fx = Fixture::new();
        let installer = fx.installer(InstallOptions::default(), &Refuse);

        fx.records
            .put(&Record {
                tooth_path: "example.com/other".to_string(),
                version: Version::new(1, 0, 0),
                possession: vec!["plugins/foo/".to_string()],
                manual: true,
            })
            .unwrap();

        let entry = fx.tooth("foo", "1.0.0");
        let resolution = fx.resolution_of(vec![entry], &[]);

        assert!(matches!(
            installer.install_all(resolution.teeth(), &resolution),
            Err(LipError::PossessionConflict { .. })
        ));
    }

    #[test]
    fn test_uninstall_removes_possession_and_record() {
        let fx = Fixture::new();
        let options = InstallOptions {
            assume_yes: true,
            ..Default::default()
        };
        let installer = fx.installer(options, &Refuse);
        let entry = fx.tooth("foo", "1.0.0");
        let resolution = fx.resolution_of(vec![entry], &[]);
        installer
            .install_all(resolution.teeth(), &resolution)
            .unwrap();

        let record = fx.records.get("example.com/foo").unwrap();
        installer.uninstall(&record).unwrap();

        assert!(!fx.context.workspace().join("plugins/foo").exists());
        assert!(!fx.records.is_installed("example.com/foo"));
    }

    #[test]
    fn test_uninstall_without_confirmation_fails() {
        let fx = Fixture::new();
        let installer = fx.installer(InstallOptions::default(), &Refuse);
        let record = Record {
            tooth_path: "example.com/foo".to_string(),
            version: Version::new(1, 0, 0),
            possession: vec!["plugins/foo/".to_string()],
            manual: true,
        };

        assert!(matches!(
            installer.uninstall(&record),
            Err(LipError::ConfirmationRequired { .. })
        ));
    }

    #[test]
    fn test_transition_upgrade_skips_older_fetch() {
        let fx = Fixture::new();
        let options = InstallOptions {
            upgrade: true,
            assume_yes: true,
            ..Default::default()
        };
        let installer = fx.installer(options, &Refuse);

        // Installed 2.0.0; fetched archive is 1.5.0.
        let installed = fx.tooth("x", "2.0.0");
        fx.records
            .put(&Record::from_tooth(&installed.tooth, true))
            .unwrap();
        let fetched = fx.tooth("x", "1.5.0");
        let canonical = fetched.canonical.clone();
        let resolution = fx.resolution_of(vec![fetched], &[canonical.as_str()]);

        installer.transition(&resolution).unwrap();

        // The newer installed version survives.
        let record = fx.records.get("example.com/x").unwrap();
        assert_eq!(record.version, Version::new(2, 0, 0));
    }

    #[test]
    fn test_transition_upgrade_uninstalls_older_record() {
        let fx = Fixture::new();
        let options = InstallOptions {
            upgrade: true,
            assume_yes: true,
            ..Default::default()
        };
        let installer = fx.installer(options, &Refuse);

        let installed = fx.tooth("x", "2.0.0");
        let resolution_seed = fx.resolution_of(vec![installed], &[]);
        fx.installer(
            InstallOptions {
                assume_yes: true,
                ..Default::default()
            },
            &Refuse,
        )
        .install_all(resolution_seed.teeth(), &resolution_seed)
        .unwrap();

        let fetched = fx.tooth("x", "2.1.0");
        let canonical = fetched.canonical.clone();
        let resolution = fx.resolution_of(vec![fetched], &[canonical.as_str()]);

        installer.transition(&resolution).unwrap();

        assert!(!fx.records.is_installed("example.com/x"));
        assert!(!fx.context.workspace().join("plugins/x").exists());
    }

    #[test]
    fn test_transition_force_reinstall_uninstalls_same_version() {
        let fx = Fixture::new();
        let options = InstallOptions {
            force_reinstall: true,
            assume_yes: true,
            ..Default::default()
        };
        let installer = fx.installer(options, &Refuse);

        let installed = fx.tooth("x", "1.0.0");
        fx.records
            .put(&Record::from_tooth(&installed.tooth, true))
            .unwrap();
        let fetched = fx.tooth("x", "1.0.0");
        let canonical = fetched.canonical.clone();
        let resolution = fx.resolution_of(vec![fetched], &[canonical.as_str()]);

        installer.transition(&resolution).unwrap();

        assert!(!fx.records.is_installed("example.com/x"));
    }

    #[test]
    fn test_transition_conflicting_flags() {
        let fx = Fixture::new();
        let options = InstallOptions {
            force_reinstall: true,
            upgrade: true,
            ..Default::default()
        };
        let installer = fx.installer(options, &Refuse);
        let resolution = Resolution::default();

        assert!(matches!(
            installer.transition(&resolution),
            Err(LipError::ConflictingFlags)
        ));
    }

    #[test]
    fn test_transition_ignores_archive_roots() {
        let fx = Fixture::new();
        let options = InstallOptions {
            force_reinstall: true,
            assume_yes: true,
            ..Default::default()
        };
        let installer = fx.installer(options, &Refuse);

        let installed = fx.tooth("x", "1.0.0");
        fx.records
            .put(&Record::from_tooth(&installed.tooth, true))
            .unwrap();

        let mut fetched = fx.tooth("x", "1.0.0");
        fetched.requirement = false; // as if it came from a .tth path
        let canonical = fetched.canonical.clone();
        let resolution = fx.resolution_of(vec![fetched], &[canonical.as_str()]);

        installer.transition(&resolution).unwrap();

        // The archive root did not trigger an uninstall.
        assert!(fx.records.is_installed("example.com/x"));
    }
}
