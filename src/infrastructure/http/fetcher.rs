//! Remote asset acquisition.
//!
//! Streams a remote media file to a local path chunk by chunk, refusing
//! responses that turn out to be HTML pages (login walls, error pages)
//! even when the transport reported success.

use futures_util::StreamExt;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

/// Hard ceiling for one asset, connect through last body byte.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid asset URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch {url}: upstream returned {status}")]
    Status { url: String, status: StatusCode },

    #[error("URL does not return a raw file: {url} (content-type: {content_type})")]
    InvalidAsset { url: String, content_type: String },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRole {
    Video,
    Audio,
}

impl fmt::Display for AssetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetRole::Video => f.write_str("video"),
            AssetRole::Audio => f.write_str("audio"),
        }
    }
}

/// Parses a client supplied location, accepting only http(s).
pub fn parse_asset_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// True when a declared content type names an HTML document.
pub fn is_html(content_type: &str) -> bool {
    match content_type.parse::<mime::Mime>() {
        Ok(m) => m.type_() == mime::TEXT && m.subtype() == mime::HTML,
        Err(_) => content_type.to_ascii_lowercase().contains("text/html"),
    }
}

#[derive(Clone)]
pub struct AssetFetcher {
    client: Client,
}

impl AssetFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self { client })
    }

    /// Downloads `url` into `dest`, overwriting it, and returns the number
    /// of bytes written. Nothing is created on disk unless the response
    /// passes the status and content-type checks.
    pub async fn fetch(&self, url: &Url, role: AssetRole, dest: &Path) -> Result<u64, FetchError> {
        debug!("Fetching {} asset from {}", role, url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if is_html(&content_type) {
            return Err(FetchError::InvalidAsset {
                url: url.to_string(),
                content_type,
            });
        }

        let write_err = |source| FetchError::Write {
            path: dest.to_path_buf(),
            source,
        };

        let mut file = File::create(dest).await.map_err(write_err)?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
            file.write_all(&chunk).await.map_err(write_err)?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(write_err)?;

        info!("⬇️ Fetched {} asset: {} bytes from {}", role, written, url);
        Ok(written)
    }
}
