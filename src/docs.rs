use utoipa::OpenApi;
use crate::common::response::ResponseStatus;
use crate::modules::jobs::dto::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::jobs::handler::submit_merge,
        crate::modules::jobs::stream_handler::download_artifact,
        crate::modules::jobs::stream_handler::probe_artifact,
    ),
    components(
        schemas(
            MergeRequest, MergeJobResponse, ResponseStatus,
        )
    ),
    tags(
        (name = "Jobs", description = "Merge jobs and resumable artifact downloads")
    )
)]
pub struct ApiDoc;
