//! Zip-backed tooth archive reader and extractor.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;

use crate::error::{LipError, LipResult};

use super::manifest::Manifest;
use super::MANIFEST_NAME;

/// One asset inside a tooth archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// Path relative to the workspace root.
    pub path: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Unix permission bits, when the archive recorded them.
    pub mode: Option<u32>,
}

/// An opened tooth archive.
///
/// Opening reads the manifest and the asset listing; nothing is extracted
/// until [`ToothFile::extract_assets`] is called.
#[derive(Debug, Clone)]
pub struct ToothFile {
    path: PathBuf,
    manifest: Manifest,
    assets: Vec<AssetEntry>,
}

impl ToothFile {
    /// Open an archive and read its manifest and asset listing.
    pub fn open(path: impl Into<PathBuf>) -> LipResult<Self> {
        let path = path.into();
        let corrupt = |reason: String| LipError::CorruptArchive {
            path: path.clone(),
            reason,
        };

        let file = File::open(&path).map_err(|e| LipError::io(&path, e))?;
        let mut archive =
            ZipArchive::new(file).map_err(|e| corrupt(format!("not a zip container: {e}")))?;

        let manifest: Manifest = {
            let entry = archive
                .by_name(MANIFEST_NAME)
                .map_err(|_| corrupt(format!("missing {MANIFEST_NAME}")))?;
            serde_json::from_reader(entry)
                .map_err(|e| corrupt(format!("invalid {MANIFEST_NAME}: {e}")))?
        };
        manifest.validate().map_err(corrupt)?;

        let mut assets = Vec::new();
        for i in 0..archive.len() {
            let entry = archive
                .by_index(i)
                .map_err(|e| corrupt(format!("unreadable entry {i}: {e}")))?;
            if entry.is_dir() || entry.name() == MANIFEST_NAME {
                continue;
            }
            // Entries with names that would escape the workspace are
            // rejected outright rather than silently skipped.
            if entry.enclosed_name().is_none() {
                return Err(corrupt(format!(
                    "entry {:?} escapes the extraction root",
                    entry.name()
                )));
            }
            assets.push(AssetEntry {
                path: entry.name().to_string(),
                size: entry.size(),
                mode: entry.unix_mode(),
            });
        }

        Ok(Self {
            path,
            manifest,
            assets,
        })
    }

    /// The manifest read from the archive.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Path of the archive file on disk.
    pub fn file_path(&self) -> &Path {
        &self.path
    }

    /// The asset listing, manifest excluded.
    pub fn assets(&self) -> &[AssetEntry] {
        &self.assets
    }

    /// Extract every asset under `dest`, returning the created file paths.
    ///
    /// On a mid-extract failure everything this call created is removed
    /// before the error is returned, so a failed install leaves no partial
    /// asset tree behind.
    pub fn extract_assets(&self, dest: &Path) -> LipResult<Vec<PathBuf>> {
        let mut created: Vec<PathBuf> = Vec::with_capacity(self.assets.len());

        match self.extract_inner(dest, &mut created) {
            Ok(()) => Ok(created),
            Err(e) => {
                rollback(dest, &created);
                Err(LipError::ExtractFailed {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn extract_inner(&self, dest: &Path, created: &mut Vec<PathBuf>) -> LipResult<()> {
        let file = File::open(&self.path).map_err(|e| LipError::io(&self.path, e))?;
        let mut archive = ZipArchive::new(file).map_err(|e| LipError::CorruptArchive {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| LipError::CorruptArchive {
                path: self.path.clone(),
                reason: format!("unreadable entry {i}: {e}"),
            })?;
            if entry.is_dir() || entry.name() == MANIFEST_NAME {
                continue;
            }
            let Some(relative) = entry.enclosed_name() else {
                continue; // validated at open; skip defensively here
            };
            let out_path = dest.join(relative);

            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|e| LipError::io(parent, e))?;
            }
            let mut out = File::create(&out_path).map_err(|e| LipError::io(&out_path, e))?;
            created.push(out_path.clone());
            io::copy(&mut entry, &mut out).map_err(|e| LipError::io(&out_path, e))?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&out_path, fs::Permissions::from_mode(mode)).ok();
            }
        }
        debug!(archive = %self.path.display(), files = created.len(), "extracted assets");
        Ok(())
    }
}

/// Remove files created by a failed extraction, then any directories the
/// removal left empty, stopping at the extraction root.
fn rollback(root: &Path, created: &[PathBuf]) {
    for path in created {
        fs::remove_file(path).ok();
    }
    for path in created {
        let mut dir = path.parent();
        while let Some(d) = dir {
            if d == root {
                break;
            }
            // remove_dir only succeeds on empty directories.
            if fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
    }
}
