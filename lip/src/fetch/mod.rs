//! Read-through archive fetching.
//!
//! The fetcher maps a specifier onto its cache entry: a hit returns the
//! cached path untouched; a miss obtains the archive — copying a local
//! file, or downloading a remote URL or a proxy-derived requirement URL —
//! into a temporary sibling that is atomically renamed into place. A failed
//! fetch never leaves a file at the final cache name, so concurrent
//! invocations sharing the cache only ever observe complete archives.

mod http;
mod progress;

pub use http::{Downloader, HttpDownloader};
pub use progress::ProgressStyle;

use std::fs;
use std::path::{Path, PathBuf};

use semver::Version;
use tracing::{debug, info, warn};

use crate::cache::ToothCache;
use crate::error::{LipError, LipResult};
use crate::specifier::Specifier;
use crate::tooth::ToothFile;

/// Obtains archives for specifiers into the cache.
pub struct Fetcher<'a, D: Downloader> {
    cache: &'a ToothCache,
    downloader: &'a D,
    index_url: &'a str,
    style: ProgressStyle,
}

impl<'a, D: Downloader> Fetcher<'a, D> {
    pub fn new(
        cache: &'a ToothCache,
        downloader: &'a D,
        index_url: &'a str,
        style: ProgressStyle,
    ) -> Self {
        Self {
            cache,
            downloader,
            index_url,
            style,
        }
    }

    /// Obtain the archive for a specifier, returning `(cache_hit, path)`.
    ///
    /// Requirement specifiers must already be pinned to a concrete version;
    /// the resolver guarantees this before fetching.
    pub fn fetch(&self, specifier: &Specifier) -> LipResult<(bool, PathBuf)> {
        let canonical = specifier.to_string();
        let final_path = self.cache.entry_path(&canonical);

        if final_path.is_file() {
            // A cache entry must be a readable archive; anything else is
            // discarded and fetched again.
            if ToothFile::open(&final_path).is_ok() {
                debug!(specifier = %canonical, "cache hit");
                return Ok((true, final_path));
            }
            warn!(specifier = %canonical, "discarding unreadable cache entry");
            fs::remove_file(&final_path).map_err(|e| LipError::io(&final_path, e))?;
        }

        fs::create_dir_all(self.cache.dir())
            .map_err(|e| LipError::io(self.cache.dir(), e))?;

        let tmp_path = final_path.with_extension("tt.tmp");
        let outcome = self
            .fetch_into(specifier, &tmp_path)
            // Only complete archives may reach the final cache name.
            .and_then(|()| ToothFile::open(&tmp_path).map(|_| ()));
        if let Err(e) = outcome {
            fs::remove_file(&tmp_path).ok();
            return Err(e);
        }
        fs::rename(&tmp_path, &final_path).map_err(|e| {
            fs::remove_file(&tmp_path).ok();
            LipError::io(&final_path, e)
        })?;

        info!(specifier = %canonical, path = %final_path.display(), "fetched");
        Ok((false, final_path))
    }

    fn fetch_into(&self, specifier: &Specifier, dest: &Path) -> LipResult<()> {
        match specifier {
            Specifier::LocalArchive { path } => {
                fs::copy(path, dest).map_err(|e| LipError::io(path, e))?;
                Ok(())
            }
            Specifier::RemoteArchive { url } => {
                self.downloader.download(url.as_str(), dest, self.style)?;
                Ok(())
            }
            Specifier::Requirement {
                tooth_path,
                version: Some(version),
                ..
            } => {
                let url = proxy_archive_url(self.index_url, tooth_path, version);
                self.downloader.download(&url, dest, self.style)?;
                Ok(())
            }
            Specifier::Requirement { version: None, .. } => Err(LipError::FetchFailed {
                url: specifier.to_string(),
                reason: "requirement has no pinned version".to_string(),
            }),
        }
    }
}

/// The proxy URL an archive for `tooth_path@version` is served from.
pub fn proxy_archive_url(index_url: &str, tooth_path: &str, version: &Version) -> String {
    format!("{index_url}/{tooth_path}/@v/v{version}.tth")
}
