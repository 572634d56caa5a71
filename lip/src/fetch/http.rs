//! HTTP transport for archive downloads.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{LipError, LipResult};

use super::progress::ProgressStyle;

/// Default timeout for HTTP requests.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Buffer size for streaming downloads (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Transport abstraction so tests can serve archives without a network.
pub trait Downloader {
    /// Download `url` into the file at `dest`, returning the byte count.
    ///
    /// `dest` is a scratch path owned by the caller; on failure the caller
    /// removes it, so implementations need not clean up.
    fn download(&self, url: &str, dest: &Path, style: ProgressStyle) -> LipResult<u64>;
}

/// Production downloader over blocking reqwest.
#[derive(Debug)]
pub struct HttpDownloader {
    client: Client,
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpDownloader {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path, style: ProgressStyle) -> LipResult<u64> {
        let fetch_failed = |reason: String| LipError::FetchFailed {
            url: url.to_string(),
            reason,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fetch_failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_failed(format!("HTTP {status}")));
        }

        let total = response.content_length().unwrap_or(0);
        let bar = style.bar(total);

        let file = File::create(dest).map_err(|e| LipError::io(dest, e))?;
        let mut writer = BufWriter::new(file);
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut downloaded: u64 = 0;

        loop {
            let n = response
                .read(&mut buffer)
                .map_err(|e| fetch_failed(format!("read error: {e}")))?;
            if n == 0 {
                break;
            }
            writer
                .write_all(&buffer[..n])
                .map_err(|e| LipError::io(dest, e))?;
            downloaded += n as u64;
            if let Some(ref bar) = bar {
                bar.set_position(downloaded);
            }
        }
        writer.flush().map_err(|e| LipError::io(dest, e))?;
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        Ok(downloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downloader_rejects_unreachable_host() {
        let downloader = HttpDownloader::with_timeout(Duration::from_millis(200));
        let temp = tempfile::TempDir::new().unwrap();
        let dest = temp.path().join("out.tth");

        let result = downloader.download(
            "http://127.0.0.1:1/never-there.tth",
            &dest,
            ProgressStyle::None,
        );
        assert!(matches!(result, Err(LipError::FetchFailed { .. })));
    }
}
