use std::path::PathBuf;

use url::Url;

use crate::config::env::{self, EnvKey};

/// Minimum size a merged artifact must reach before it is handed out.
pub const DEFAULT_MIN_OUTPUT_BYTES: u64 = 10_000;

/// Read granularity for download bodies.
pub const DEFAULT_STREAM_CHUNK_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub storage_dir: PathBuf,
    pub public_base_url: Url,
    pub ffmpeg_bin: String,
    pub min_output_bytes: u64,
    pub stream_chunk_bytes: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PUBLIC_BASE_URL is not a valid URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let server_port = env::get_parsed(EnvKey::ServerPort, 3000);
        let public_base_url = env::get_or(
            EnvKey::PublicBaseUrl,
            &format!("http://localhost:{}", server_port),
        );

        Ok(Self {
            server_host: env::get_or(EnvKey::ServerHost, "0.0.0.0"),
            server_port,
            storage_dir: PathBuf::from(env::get_or(EnvKey::StorageDir, "/tmp/merge-jobs")),
            public_base_url: normalize_base_url(&public_base_url)?,
            ffmpeg_bin: env::get_or(EnvKey::FfmpegBin, "ffmpeg"),
            min_output_bytes: env::get_parsed(EnvKey::MinOutputBytes, DEFAULT_MIN_OUTPUT_BYTES),
            stream_chunk_bytes: env::get_parsed(
                EnvKey::StreamChunkBytes,
                DEFAULT_STREAM_CHUNK_BYTES,
            )
            .max(1),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Parses a base URL so that relative joins append instead of replacing
/// the last path segment.
pub fn normalize_base_url(raw: &str) -> Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{}/", raw))
    }
}
