use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::error::FolioError;

pub const HTML: &str = "text/html";
pub const JSON: &str = "application/json";

/// Transport for fragments and data documents. Every call is a fresh request:
/// no retries, no caching.
pub trait Fetch: Send + Sync {
    /// Fetch `url` as text. `content_type` is a hint passed to the transport.
    fn fetch(&self, url: &str, content_type: &str) -> Result<String, FolioError>;
}

/// Fetch an HTML fragment.
pub fn load_text(fetcher: &dyn Fetch, url: &str) -> Result<String, FolioError> {
    fetcher.fetch(url, HTML)
}

/// Fetch and decode a JSON document. Decoding errors are load failures too.
pub fn load_json(fetcher: &dyn Fetch, url: &str) -> Result<Value, FolioError> {
    let body = fetcher.fetch(url, JSON)?;
    serde_json::from_str(&body).map_err(|e| FolioError::load(url, format!("JSON parse error: {}", e)))
}

// ── HTTP ──────────────────────────────────────────────

/// Fetches over HTTP(S), resolving relative URLs against the site base.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    base: url::Url,
}

impl HttpFetcher {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, FolioError> {
        let mut base = url::Url::parse(base)
            .map_err(|e| FolioError::Configuration(format!("Invalid base URL {}: {}", base, e)))?;
        // Url::join treats the last segment as a file unless the path ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FolioError::Configuration(format!("HTTP client error: {}", e)))?;
        Ok(HttpFetcher { client, base })
    }

    fn resolve(&self, url: &str) -> Result<url::Url, FolioError> {
        self.base
            .join(url)
            .map_err(|e| FolioError::load(url, format!("invalid URL: {}", e)))
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str, content_type: &str) -> Result<String, FolioError> {
        let target = self.resolve(url)?;
        log::debug!("[fetch] GET {}", target);
        let resp = self
            .client
            .get(target)
            .header(CONTENT_TYPE, content_type)
            .send()
            .map_err(|e| FolioError::load(url, format!("request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(FolioError::load(url, format!("status {}", resp.status())));
        }
        resp.text()
            .map_err(|e| FolioError::load(url, format!("body read failed: {}", e)))
    }
}

// ── Files ─────────────────────────────────────────────

/// Serves a site from a directory on disk, the way a static file server would.
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileFetcher { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a site-relative URL onto the root, ignoring query and fragment.
    /// Parent-directory segments are refused.
    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let path = url.split(['?', '#']).next().unwrap_or("");
        let path = path.trim_start_matches("./").trim_start_matches('/');
        if path.is_empty() || path.split('/').any(|seg| seg == "..") {
            return None;
        }
        Some(self.root.join(path))
    }
}

impl Fetch for FileFetcher {
    fn fetch(&self, url: &str, _content_type: &str) -> Result<String, FolioError> {
        let path = self
            .resolve(url)
            .ok_or_else(|| FolioError::load(url, "status 403 (path refused)"))?;
        log::debug!("[fetch] read {}", path.display());
        if !path.is_file() {
            return Err(FolioError::load(url, "status 404"));
        }
        std::fs::read_to_string(&path).map_err(|e| FolioError::load(url, e.to_string()))
    }
}
