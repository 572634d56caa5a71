//! Repository version index client.
//!
//! The index is a Go-module-proxy-style HTTP service: `GET
//! {base}/{tooth_path}/@v/list` answers with one published version per line.
//! The resolver only relies on the ordering contract — newest first — so the
//! client sorts defensively instead of trusting the server's order.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{LipError, LipResult};
use crate::version::{precedence, Version};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Queries the set of published versions of a tooth repository.
pub trait VersionIndex {
    /// Confirm the repository name is known to the index.
    fn probe(&self, tooth_path: &str) -> LipResult<()>;

    /// Fetch the published versions, newest first.
    fn fetch_version_list(&self, tooth_path: &str) -> LipResult<Vec<Version>>;
}

/// Production index client over HTTP.
#[derive(Debug)]
pub struct HttpVersionIndex {
    base_url: String,
    client: Client,
}

impl HttpVersionIndex {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn list_url(&self, tooth_path: &str) -> String {
        format!("{}/{}/@v/list", self.base_url, tooth_path)
    }

    fn fetch_list_body(&self, tooth_path: &str) -> LipResult<String> {
        let url = self.list_url(tooth_path);
        debug!(%url, "querying version list");
        let response = self.client.get(&url).send().map_err(|e| {
            LipError::IndexUnavailable {
                tooth_path: tooth_path.to_string(),
                reason: e.to_string(),
            }
        })?;

        match response.status() {
            StatusCode::OK => response.text().map_err(|e| LipError::IndexUnavailable {
                tooth_path: tooth_path.to_string(),
                reason: e.to_string(),
            }),
            StatusCode::NOT_FOUND | StatusCode::GONE => Err(LipError::UnknownRepository {
                tooth_path: tooth_path.to_string(),
                reason: format!("index answered HTTP {}", response.status()),
            }),
            status => Err(LipError::IndexUnavailable {
                tooth_path: tooth_path.to_string(),
                reason: format!("index answered HTTP {status}"),
            }),
        }
    }
}

impl VersionIndex for HttpVersionIndex {
    fn probe(&self, tooth_path: &str) -> LipResult<()> {
        self.fetch_list_body(tooth_path).map(|_| ())
    }

    fn fetch_version_list(&self, tooth_path: &str) -> LipResult<Vec<Version>> {
        let body = self.fetch_list_body(tooth_path)?;
        let versions = parse_version_list(tooth_path, &body)?;
        Ok(sorted_newest_first(versions))
    }
}

/// Parse the line-oriented list body. Lines may carry the proxy's `v`
/// prefix.
fn parse_version_list(tooth_path: &str, body: &str) -> LipResult<Vec<Version>> {
    let mut versions = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let raw = line.strip_prefix('v').unwrap_or(line);
        let version = Version::parse(raw).map_err(|e| LipError::IndexUnavailable {
            tooth_path: tooth_path.to_string(),
            reason: format!("unparsable version {line:?}: {e}"),
        })?;
        versions.push(version);
    }
    Ok(versions)
}

/// Sort newest first by SemVer precedence, regardless of server order.
pub fn sorted_newest_first(mut versions: Vec<Version>) -> Vec<Version> {
    versions.sort_by(|a, b| precedence(b, a));
    versions
}
