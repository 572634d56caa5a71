//! Filesystem context for the install pipeline.
//!
//! The pipeline touches two state roots: a per-user `~/.lip` directory
//! holding the archive cache, and a per-workspace `./.lip` directory holding
//! the install records. Both are captured in a [`Context`] value constructed
//! once and passed explicitly through the pipeline, so tests can point the
//! whole machinery at a temporary filesystem root.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LipError, LipResult};

/// Default repository index endpoint, a Go-module-proxy-style service.
pub const DEFAULT_INDEX_URL: &str = "https://goproxy.io";

/// Environment variable overriding the repository index endpoint.
pub const INDEX_URL_ENV: &str = "LIP_INDEX_URL";

/// The two state roots and the index endpoint used by one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory containing the per-user `.lip` root (normally `$HOME`).
    home: PathBuf,
    /// The workspace directory teeth are installed into (normally the cwd).
    workspace: PathBuf,
    /// Base URL of the repository index.
    index_url: String,
}

impl Context {
    /// Build a context from explicit roots. Used by tests and embedders.
    pub fn new(
        home: impl Into<PathBuf>,
        workspace: impl Into<PathBuf>,
        index_url: impl Into<String>,
    ) -> Self {
        Self {
            home: home.into(),
            workspace: workspace.into(),
            index_url: index_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Discover the context from the process environment: the user's home
    /// directory, the current working directory, and `LIP_INDEX_URL` if set.
    pub fn discover() -> LipResult<Self> {
        let home = home_dir().ok_or_else(|| LipError::Io {
            path: PathBuf::from("~"),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "failed to determine the user home directory",
            ),
        })?;
        let workspace =
            env::current_dir().map_err(|e| LipError::io(PathBuf::from("."), e))?;
        let index_url =
            env::var(INDEX_URL_ENV).unwrap_or_else(|_| DEFAULT_INDEX_URL.to_string());
        Ok(Self::new(home, workspace, index_url))
    }

    /// Create the cache and record directories if they do not exist.
    pub fn init(&self) -> LipResult<()> {
        for dir in [self.cache_dir(), self.record_dir()] {
            fs::create_dir_all(&dir).map_err(|e| LipError::io(&dir, e))?;
        }
        Ok(())
    }

    /// The per-user `.lip` root.
    pub fn home_lip_dir(&self) -> PathBuf {
        self.home.join(".lip")
    }

    /// The archive cache directory, `~/.lip/cache`.
    pub fn cache_dir(&self) -> PathBuf {
        self.home_lip_dir().join("cache")
    }

    /// The per-workspace `.lip` root.
    pub fn workspace_lip_dir(&self) -> PathBuf {
        self.workspace.join(".lip")
    }

    /// The record directory, `./.lip/records`.
    pub fn record_dir(&self) -> PathBuf {
        self.workspace_lip_dir().join("records")
    }

    /// The workspace directory assets are extracted into.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Base URL of the repository index.
    pub fn index_url(&self) -> &str {
        &self.index_url
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_layout() {
        let ctx = Context::new("/home/u", "/work", "https://index.example.com");

        assert_eq!(ctx.cache_dir(), PathBuf::from("/home/u/.lip/cache"));
        assert_eq!(ctx.record_dir(), PathBuf::from("/work/.lip/records"));
        assert_eq!(ctx.workspace(), Path::new("/work"));
        assert_eq!(ctx.index_url(), "https://index.example.com");
    }

    #[test]
    fn test_index_url_trailing_slash_is_trimmed() {
        let ctx = Context::new("/h", "/w", "https://index.example.com/");
        assert_eq!(ctx.index_url(), "https://index.example.com");
    }

    #[test]
    fn test_init_creates_both_roots() {
        let home = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let ctx = Context::new(home.path(), work.path(), DEFAULT_INDEX_URL);

        ctx.init().unwrap();

        assert!(ctx.cache_dir().is_dir());
        assert!(ctx.record_dir().is_dir());
    }
}
