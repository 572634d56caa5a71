//! Content-addressed archive cache.
//!
//! Every fetched archive lands in `~/.lip/cache` under a filename derived
//! from the specifier's canonical string: the URL-safe base64 encoding of
//! the string plus a `.tt` suffix. The encoding is reversible so the cache
//! directory can be listed back to specifier strings. The core never evicts
//! entries; `purge` exists for the CLI's cache maintenance surface.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::error::{LipError, LipResult};

/// File extension of cached archives.
pub const CACHE_SUFFIX: &str = ".tt";

/// The archive cache directory.
#[derive(Debug, Clone)]
pub struct ToothCache {
    dir: PathBuf,
}

impl ToothCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The cache directory itself.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The on-disk path for a canonical specifier string.
    pub fn entry_path(&self, canonical: &str) -> PathBuf {
        self.dir.join(encode_entry_name(canonical))
    }

    /// List cached entries as `(canonical specifier, path)` pairs.
    ///
    /// Files that do not decode as cache entries are skipped.
    pub fn entries(&self) -> LipResult<Vec<(String, PathBuf)>> {
        let mut out = Vec::new();
        if !self.dir.exists() {
            return Ok(out);
        }
        let listing = fs::read_dir(&self.dir).map_err(|e| LipError::io(&self.dir, e))?;
        for entry in listing {
            let entry = entry.map_err(|e| LipError::io(&self.dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Ok(canonical) = decode_entry_name(name) {
                out.push((canonical, entry.path()));
            }
        }
        out.sort();
        Ok(out)
    }

    /// Delete every cached archive, returning how many were removed.
    pub fn purge(&self) -> LipResult<usize> {
        let mut removed = 0;
        for (_, path) in self.entries()? {
            fs::remove_file(&path).map_err(|e| LipError::io(&path, e))?;
            removed += 1;
        }
        Ok(removed)
    }
}

/// Encode a canonical specifier into a cache filename.
pub fn encode_entry_name(canonical: &str) -> String {
    format!("{}{}", URL_SAFE_NO_PAD.encode(canonical), CACHE_SUFFIX)
}

/// Decode a cache filename back into the canonical specifier.
pub fn decode_entry_name(file_name: &str) -> LipResult<String> {
    let invalid = || LipError::InvalidSpecifier {
        input: file_name.to_string(),
        reason: "not a cache entry name".to_string(),
    };
    let stem = file_name.strip_suffix(CACHE_SUFFIX).ok_or_else(invalid)?;
    let bytes = URL_SAFE_NO_PAD.decode(stem).map_err(|_| invalid())?;
    String::from_utf8(bytes).map_err(|_| invalid())
}
