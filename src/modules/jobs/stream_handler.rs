use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::info;

use super::range::{resolve_range, RangeRequest};
use crate::common::error::AppError;
use crate::infrastructure::storage::artifacts::{JobId, StoredArtifact};
use crate::state::AppState;

const CONTENT_TYPE: &str = "video/mp4";

/// Unknown or unparseable ids are indistinguishable from jobs that never
/// produced output.
fn parse_job_id(raw: &str) -> Result<JobId, AppError> {
    raw.parse::<JobId>()
        .map_err(|_| AppError::NotFound(raw.to_string()))
}

/// Lazily yields at most `len` bytes of `reader` in chunks of up to
/// `chunk_size`. Short reads produce short chunks; only a zero-length read
/// or an exhausted window ends the body. Dropping the body closes the reader.
pub fn window_body<R>(reader: R, len: u64, chunk_size: usize) -> Body
where
    R: AsyncRead + Send + 'static,
{
    Body::from_stream(ReaderStream::with_capacity(reader.take(len), chunk_size))
}

fn base_headers() -> axum::http::response::Builder {
    Response::builder()
        .header(header::CONTENT_TYPE, CONTENT_TYPE)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, "no-store")
}

async fn open_artifact(artifact: &StoredArtifact, id: &JobId) -> Result<File, AppError> {
    File::open(&artifact.path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound(id.to_string())
        } else {
            AppError::Io(e)
        }
    })
}

/// Download the merged artifact, honouring a single-window `Range` header
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{job_id}/download",
    params(
        ("job_id" = String, Path, description = "Job ID returned by the merge call")
    ),
    responses(
        (status = 200, description = "Full artifact"),
        (status = 206, description = "Partial Content"),
        (status = 404, description = "Job Not Found"),
        (status = 416, description = "Range Not Satisfiable")
    ),
    tag = "Jobs"
)]
pub async fn download_artifact(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let id = parse_job_id(&job_id)?;
    let artifact = state.store.locate_output(&id).await?;
    let range = resolve_range(headers.get(header::RANGE), artifact.size)?;
    let chunk_size = state.config.stream_chunk_bytes;

    let mut file = open_artifact(&artifact, &id).await?;

    match range {
        RangeRequest::Partial(window) => {
            file.seek(SeekFrom::Start(window.start)).await?;
            info!(
                "📤 Serving job {} bytes {}-{}/{}",
                id, window.start, window.end, artifact.size
            );

            base_headers()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_LENGTH, window.len().to_string())
                .header(header::CONTENT_RANGE, window.content_range(artifact.size))
                .body(window_body(file, window.len(), chunk_size))
                .map_err(|e| AppError::Internal(e.to_string()))
        }
        RangeRequest::Full => {
            info!("📤 Serving job {} in full ({} bytes)", id, artifact.size);

            base_headers()
                .status(StatusCode::OK)
                .header(header::CONTENT_LENGTH, artifact.size.to_string())
                .body(window_body(file, artifact.size, chunk_size))
                .map_err(|e| AppError::Internal(e.to_string()))
        }
    }
}

/// Report size and range support for the merged artifact without a body
#[utoipa::path(
    head,
    path = "/api/v1/jobs/{job_id}/download",
    params(
        ("job_id" = String, Path, description = "Job ID returned by the merge call")
    ),
    responses(
        (status = 200, description = "Artifact metadata"),
        (status = 404, description = "Job Not Found")
    ),
    tag = "Jobs"
)]
pub async fn probe_artifact(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_job_id(&job_id)?;
    let artifact = state.store.locate_output(&id).await?;

    base_headers()
        .status(StatusCode::OK)
        .header(header::CONTENT_LENGTH, artifact.size.to_string())
        .body(Body::empty())
        .map_err(|e| AppError::Internal(e.to_string()))
}
