use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::state::AppState;

pub mod dto;
pub mod handler;
pub mod range;
pub mod service;
pub mod stream_handler;

/// Two URLs never need more than this.
const MERGE_FORM_LIMIT: usize = 16 * 1024;

pub fn router() -> Router<AppState> {
    let submit_routes = Router::new()
        .route("/merge", post(handler::submit_merge))
        .route_layer(RequestBodyLimitLayer::new(MERGE_FORM_LIMIT));

    let download_routes = Router::new().route(
        "/jobs/{job_id}/download",
        get(stream_handler::download_artifact).head(stream_handler::probe_artifact),
    );

    submit_routes.merge(download_routes)
}
