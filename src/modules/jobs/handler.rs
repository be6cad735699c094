use super::dto::{MergeJobResponse, MergeRequest};
use super::service::JobService;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::state::AppState;
use axum::{
    extract::{rejection::FormRejection, State},
    response::IntoResponse,
    Form,
};

/// Fetch a video and an audio asset and merge them into one MP4
#[utoipa::path(
    post,
    path = "/api/v1/merge",
    request_body(content = MergeRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Merge completed", body = ApiResponse<MergeJobResponse>),
        (status = 400, description = "Bad or unfetchable input"),
        (status = 500, description = "Merge failed")
    ),
    tag = "Jobs"
)]
pub async fn submit_merge(
    State(state): State<AppState>,
    form: Result<Form<MergeRequest>, FormRejection>,
) -> impl IntoResponse {
    let Form(req) = match form {
        Ok(form) => form,
        Err(rejection) => {
            return ApiError::bad_request(rejection.body_text()).into_response();
        }
    };

    match JobService::submit(state, req).await {
        Ok(res) => ApiSuccess::created(res, "Merge completed successfully").into_response(),
        Err(e) => e.into_response(),
    }
}
