use time::OffsetDateTime;
use tracing::{error, info};
use url::Url;
use validator::Validate;

use super::dto::{MergeJobResponse, MergeRequest};
use crate::common::error::AppError;
use crate::infrastructure::http::fetcher::{parse_asset_url, AssetRole};
use crate::infrastructure::storage::artifacts::JobId;
use crate::state::AppState;

pub struct JobService;

impl JobService {
    /// Runs one merge job to completion: fetch both assets, merge, check
    /// the output. The job id is only handed back once the artifact is
    /// ready to download.
    pub async fn submit(state: AppState, req: MergeRequest) -> Result<MergeJobResponse, AppError> {
        req.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let video_url = parse_asset_url(&req.video_url)?;
        let audio_url = parse_asset_url(&req.audio_url)?;

        let id = state.store.new_job();
        let created_at = OffsetDateTime::now_utc();
        info!("📦 Accepted merge job {}", id);

        // Detached so a client hanging up cannot leave a half-written output.
        let worker_state = state.clone();
        let size = tokio::spawn(async move {
            run_pipeline(&worker_state, id, video_url, audio_url).await
        })
        .await
        .map_err(|e| AppError::Internal(format!("merge task for job {} aborted: {}", id, e)))??;

        Ok(MergeJobResponse {
            job_id: id,
            download_url: download_url(&state.config.public_base_url, &id)?,
            size_bytes: size,
            created_at,
        })
    }
}

pub fn download_url(base: &Url, id: &JobId) -> Result<String, AppError> {
    base.join(&format!("api/v1/jobs/{}/download", id))
        .map(String::from)
        .map_err(|e| AppError::Internal(format!("cannot build download URL: {}", e)))
}

async fn run_pipeline(
    state: &AppState,
    id: JobId,
    video_url: Url,
    audio_url: Url,
) -> Result<u64, AppError> {
    let paths = state.store.paths(&id);

    let fetched = tokio::try_join!(
        state.fetcher.fetch(&video_url, AssetRole::Video, &paths.video_input),
        state.fetcher.fetch(&audio_url, AssetRole::Audio, &paths.audio_input),
    );
    if let Err(e) = fetched {
        error!("❌ Job {} failed while fetching assets: {}", id, e);
        state.store.discard_inputs(&id).await;
        return Err(e.into());
    }

    let merged: Result<u64, AppError> = async {
        let output = state.merger.merge_streams(&paths).await?;
        state
            .store
            .ensure_ready(&output, state.config.min_output_bytes)
            .await
    }
    .await;

    match merged {
        Ok(size) => {
            info!("✅ Job {} ready: {} bytes at {}", id, size, paths.output.display());
            Ok(size)
        }
        Err(e) => {
            error!("❌ Job {} failed to merge: {}", id, e);
            state.store.discard_output(&id).await;
            Err(e)
        }
    }
}
