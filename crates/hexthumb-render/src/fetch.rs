//! Poster byte sources.
//!
//! Every failure here is ordinary: the renderer turns any `Err` into the
//! placeholder panel.
//!
//! Poster URLs usually come from catalog records, so [`HttpFetcher`] only
//! touches the local filesystem when explicitly told to.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;

use hexthumb_core::{ThumbError, ThumbResult};

/// Largest poster body accepted.
pub const MAX_IMAGE_BYTES: u64 = 15 * 1024 * 1024;

/// Something that can turn a poster URL into encoded image bytes.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> ThumbResult<Vec<u8>>;
}

/// Fetches over HTTP(S) with a bounded timeout. With
/// [`HttpFetcher::with_local_files`], paths and `file://` URLs naming an
/// existing local file are read from disk as well.
pub struct HttpFetcher {
    client: Client,
    max_bytes: u64,
    local_files: bool,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> ThumbResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hexthumb/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ThumbError::fetch(format!("failed to build HTTP client: {}", e), ""))?;
        Ok(Self {
            client,
            max_bytes: MAX_IMAGE_BYTES,
            local_files: false,
        })
    }

    /// Also serve non-HTTP URLs from disk. Only for records from a trusted
    /// source.
    pub fn with_local_files(mut self, enabled: bool) -> Self {
        self.local_files = enabled;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn fetch_http(&self, url: &str) -> ThumbResult<Vec<u8>> {
        let res = self
            .client
            .get(url)
            .send()
            .map_err(|e| ThumbError::fetch(format!("request failed: {}", e), url))?;

        if !res.status().is_success() {
            return Err(ThumbError::fetch(format!("HTTP {}", res.status()), url));
        }
        if res.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(ThumbError::fetch("image exceeds size limit", url));
        }

        let mut body = Vec::new();
        res.take(self.max_bytes + 1)
            .read_to_end(&mut body)
            .map_err(|e| ThumbError::fetch(format!("failed to read body: {}", e), url))?;
        if body.len() as u64 > self.max_bytes {
            return Err(ThumbError::fetch("image exceeds size limit", url));
        }
        Ok(body)
    }

    fn fetch_file(&self, url: &str) -> ThumbResult<Vec<u8>> {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if !path.is_file() {
            return Err(ThumbError::fetch("not an HTTP URL or local file", url));
        }
        let len = std::fs::metadata(path)?.len();
        if len > self.max_bytes {
            return Err(ThumbError::fetch("image exceeds size limit", url));
        }
        Ok(std::fs::read(path)?)
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> ThumbResult<Vec<u8>> {
        if is_http_url(url) {
            self.fetch_http(url.trim())
        } else if self.local_files {
            self.fetch_file(url.trim())
        } else {
            Err(ThumbError::fetch("only http(s) poster URLs are allowed", url))
        }
    }
}

/// A fetcher that never succeeds; every poster becomes the placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFetcher;

impl ImageFetcher for OfflineFetcher {
    fn fetch(&self, url: &str) -> ThumbResult<Vec<u8>> {
        Err(ThumbError::fetch("offline", url))
    }
}

pub fn is_http_url(s: &str) -> bool {
    let s = s.trim();
    s.starts_with("http://") || s.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://img.example/a.jpg"));
        assert!(is_http_url(" http://x"));
        assert!(!is_http_url("ftp://x"));
        assert!(!is_http_url("/tmp/poster.png"));
    }

    #[test]
    fn test_offline_always_fails() {
        assert!(matches!(
            OfflineFetcher.fetch("https://img.example/a.jpg"),
            Err(ThumbError::Fetch { .. })
        ));
    }

    fn local_fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(1)).unwrap().with_local_files(true)
    }

    #[test]
    fn test_local_paths_refused_by_default() {
        let path = std::env::temp_dir().join("hexthumb_fetch_private.bin");
        std::fs::write(&path, b"secret").unwrap();
        let fetcher = HttpFetcher::new(Duration::from_secs(1)).unwrap();
        let url = path.to_str().unwrap();
        assert!(matches!(fetcher.fetch(url), Err(ThumbError::Fetch { .. })));
        assert!(matches!(
            fetcher.fetch(&format!("file://{}", url)),
            Err(ThumbError::Fetch { .. })
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_reads_local_file_when_enabled() {
        let path = std::env::temp_dir().join("hexthumb_fetch_test.bin");
        std::fs::write(&path, b"poster").unwrap();
        let bytes = local_fetcher().fetch(path.to_str().unwrap()).unwrap();
        assert_eq!(bytes, b"poster");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_local_file_size_cap() {
        let path = std::env::temp_dir().join("hexthumb_fetch_cap.bin");
        std::fs::write(&path, vec![0u8; 64]).unwrap();
        let fetcher = local_fetcher().with_max_bytes(16);
        assert!(fetcher.fetch(path.to_str().unwrap()).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_local_file_is_fetch_error() {
        let fetcher = local_fetcher();
        assert!(matches!(
            fetcher.fetch("/nonexistent/poster.jpg"),
            Err(ThumbError::Fetch { .. })
        ));
    }
}
