//! Filesystem-backed job table.
//!
//! A job has no record anywhere except the files named after its id. The
//! merge request writes them, a later download request finds them again by
//! recomputing the same paths. Nothing in here deletes successful output;
//! retention of `{id}_final.mp4` is left to whatever reaps the storage dir.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::common::error::AppError;

/// Opaque job identifier. Random v4 UUIDs keep concurrent submits apart
/// without any shared counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// The three artifacts owned by one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPaths {
    pub video_input: PathBuf,
    pub audio_input: PathBuf,
    pub output: PathBuf,
}

/// A finished output located on disk.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn init(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    pub fn new_job(&self) -> JobId {
        JobId::new()
    }

    pub fn paths(&self, id: &JobId) -> JobPaths {
        JobPaths {
            video_input: self.root.join(format!("{}_video.mp4", id)),
            audio_input: self.root.join(format!("{}_audio.wav", id)),
            output: self.root.join(format!("{}_final.mp4", id)),
        }
    }

    /// Fails with `NotReady` unless `path` is a file of at least `min_bytes`.
    pub async fn ensure_ready(&self, path: &Path, min_bytes: u64) -> Result<u64, AppError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(AppError::NotReady {
                    path: path.to_path_buf(),
                    reason: "output file was not produced".to_string(),
                });
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        if !metadata.is_file() {
            return Err(AppError::NotReady {
                path: path.to_path_buf(),
                reason: "output is not a regular file".to_string(),
            });
        }

        let size = metadata.len();
        if size < min_bytes {
            return Err(AppError::NotReady {
                path: path.to_path_buf(),
                reason: format!("output is {} bytes, expected at least {}", size, min_bytes),
            });
        }

        Ok(size)
    }

    /// Resolves the merged output of a job, or `NotFound` when the job was
    /// never created, failed, or has been reaped.
    pub async fn locate_output(&self, id: &JobId) -> Result<StoredArtifact, AppError> {
        let path = self.paths(id).output;
        match tokio::fs::metadata(&path).await {
            Ok(m) if m.is_file() => Ok(StoredArtifact {
                path,
                size: m.len(),
            }),
            Ok(_) => Err(AppError::NotFound(id.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(AppError::NotFound(id.to_string()))
            }
            Err(e) => Err(AppError::Io(e)),
        }
    }

    pub async fn discard_inputs(&self, id: &JobId) {
        let paths = self.paths(id);
        remove_quietly(&paths.video_input).await;
        remove_quietly(&paths.audio_input).await;
    }

    pub async fn discard_output(&self, id: &JobId) {
        remove_quietly(&self.paths(id).output).await;
    }
}

async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}
