//! Persistent install records.
//!
//! One JSON file per installed tooth lives under `./.lip/records`. The
//! filename is a reversible URL-safe base64 encoding of the tooth path, so
//! listing the directory reconstructs the installed set without opening any
//! file.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LipError, LipResult};
use crate::tooth::ToothFile;

/// File extension of record files.
pub const RECORD_SUFFIX: &str = ".json";

/// Evidence that one tooth is installed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The installed tooth's repository name.
    pub tooth_path: String,

    /// The installed version.
    pub version: Version,

    /// Path prefixes the tooth owns, consulted by uninstall.
    #[serde(default)]
    pub possession: Vec<String>,

    /// True when the tooth was requested directly rather than pulled in as
    /// a dependency.
    #[serde(default)]
    pub manual: bool,
}

impl Record {
    /// Build the record for a freshly installed tooth.
    pub fn from_tooth(tooth: &ToothFile, manual: bool) -> Self {
        let manifest = tooth.manifest();
        Self {
            tooth_path: manifest.tooth_path.clone(),
            version: manifest.version.clone(),
            possession: manifest.possession.clone(),
            manual,
        }
    }
}

/// Encode a tooth path into its record filename.
pub fn encode_record_name(tooth_path: &str) -> String {
    format!("{}{}", URL_SAFE_NO_PAD.encode(tooth_path), RECORD_SUFFIX)
}

/// Decode a record filename back into the tooth path.
pub fn decode_record_name(file_name: &str) -> LipResult<String> {
    let invalid = |reason: &str| LipError::RecordCorrupt {
        path: PathBuf::from(file_name),
        reason: reason.to_string(),
    };
    let stem = file_name
        .strip_suffix(RECORD_SUFFIX)
        .ok_or_else(|| invalid("missing .json suffix"))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(stem)
        .map_err(|_| invalid("filename is not valid base64url"))?;
    String::from_utf8(bytes).map_err(|_| invalid("decoded name is not UTF-8"))
}

/// The record directory and its operations.
///
/// Writes go through a `.tmp` sibling and an atomic rename, so a cancel
/// between steps never leaves a half-written record at the final name.
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The record directory itself.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, tooth_path: &str) -> PathBuf {
        self.dir.join(encode_record_name(tooth_path))
    }

    /// Whether a record exists for the tooth path.
    pub fn is_installed(&self, tooth_path: &str) -> bool {
        self.record_path(tooth_path).is_file()
    }

    /// Load the record for a tooth path.
    pub fn get(&self, tooth_path: &str) -> LipResult<Record> {
        let path = self.record_path(tooth_path);
        if !path.is_file() {
            return Err(LipError::RecordNotFound {
                tooth_path: tooth_path.to_string(),
            });
        }
        let data = fs::read(&path).map_err(|e| LipError::io(&path, e))?;
        let record: Record =
            serde_json::from_slice(&data).map_err(|e| LipError::RecordCorrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        if record.tooth_path != tooth_path {
            return Err(LipError::RecordCorrupt {
                path,
                reason: format!(
                    "record names {} but was stored under {}",
                    record.tooth_path, tooth_path
                ),
            });
        }
        Ok(record)
    }

    /// Load the record if one exists.
    pub fn try_get(&self, tooth_path: &str) -> LipResult<Option<Record>> {
        match self.get(tooth_path) {
            Ok(record) => Ok(Some(record)),
            Err(LipError::RecordNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Persist a record, replacing any previous one for the same tooth.
    pub fn put(&self, record: &Record) -> LipResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| LipError::io(&self.dir, e))?;
        let path = self.record_path(&record.tooth_path);
        let tmp = path.with_extension("json.tmp");

        let data = serde_json::to_vec_pretty(record).map_err(|e| LipError::RecordCorrupt {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&tmp, data).map_err(|e| LipError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| {
            fs::remove_file(&tmp).ok();
            LipError::io(&path, e)
        })?;
        debug!(tooth = %record.tooth_path, version = %record.version, "record written");
        Ok(())
    }

    /// Remove the record for a tooth path.
    pub fn remove(&self, tooth_path: &str) -> LipResult<()> {
        let path = self.record_path(tooth_path);
        if !path.is_file() {
            return Err(LipError::RecordNotFound {
                tooth_path: tooth_path.to_string(),
            });
        }
        fs::remove_file(&path).map_err(|e| LipError::io(&path, e))
    }

    /// Enumerate every record, sorted by tooth path.
    ///
    /// A file in the record directory that does not decode as a record name
    /// is reported as corruption rather than skipped.
    pub fn list(&self) -> LipResult<Vec<Record>> {
        let mut records = Vec::new();
        if !self.dir.exists() {
            return Ok(records);
        }
        let listing = fs::read_dir(&self.dir).map_err(|e| LipError::io(&self.dir, e))?;
        for entry in listing {
            let entry = entry.map_err(|e| LipError::io(&self.dir, e))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.ends_with(".tmp") {
                continue; // leftover from an interrupted write
            }
            let tooth_path = decode_record_name(&name)?;
            records.push(self.get(&tooth_path)?);
        }
        records.sort_by(|a, b| a.tooth_path.cmp(&b.tooth_path));
        Ok(records)
    }
}
