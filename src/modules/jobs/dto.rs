use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use validator::Validate;

use crate::infrastructure::storage::artifacts::JobId;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MergeRequest {
    /// Location of the media whose first video stream is kept.
    #[validate(length(min = 1, message = "video_url is required"))]
    pub video_url: String,
    /// Location of the media whose first audio stream replaces the original audio.
    #[validate(length(min = 1, message = "audio_url is required"))]
    pub audio_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MergeJobResponse {
    #[schema(value_type = String, format = Uuid)]
    pub job_id: JobId,
    pub download_url: String,
    pub size_bytes: u64,
    #[serde(with = "time::serde::iso8601")]
    pub created_at: OffsetDateTime,
}
