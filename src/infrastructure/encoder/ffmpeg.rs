use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::infrastructure::storage::artifacts::JobPaths;

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("failed to launch encoder '{bin}': {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("encoder exited with code {exit_code:?}: {stderr}")]
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },
}

/// Combines the video stream of one input with the audio stream of another.
#[async_trait]
pub trait StreamMerger: Send + Sync {
    /// Writes `paths.output` from `paths.video_input` and `paths.audio_input`
    /// and returns the output path. Does not inspect the result.
    async fn merge_streams(&self, paths: &JobPaths) -> Result<PathBuf, MergeError>;
}

#[derive(Debug, Clone)]
pub struct FfmpegMerger {
    bin: String,
}

impl FfmpegMerger {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

/// Fixed invocation: video copied from input 0, audio from input 1
/// re-encoded to AAC with timestamps resampled from zero, cut to the
/// shorter stream, moov atom moved up front.
pub fn merge_args(paths: &JobPaths) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-i".into(),
        paths.video_input.clone().into(),
        "-i".into(),
        paths.audio_input.clone().into(),
        "-map".into(),
        "0:v:0".into(),
        "-map".into(),
        "1:a:0".into(),
        "-c:v".into(),
        "copy".into(),
        "-c:a".into(),
        "aac".into(),
        "-af".into(),
        "aresample=async=1:first_pts=0".into(),
        "-shortest".into(),
        "-movflags".into(),
        "+faststart".into(),
        paths.output.clone().into(),
    ]
}

#[async_trait]
impl StreamMerger for FfmpegMerger {
    async fn merge_streams(&self, paths: &JobPaths) -> Result<PathBuf, MergeError> {
        let args = merge_args(paths);
        debug!("FFmpeg args: {:?}", args);
        info!("🎬 Merging {} + {}", paths.video_input.display(), paths.audio_input.display());

        let output = Command::new(&self.bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| MergeError::Spawn {
                bin: self.bin.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(MergeError::Failed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(paths.output.clone())
    }
}
