use std::sync::Arc;

use crate::config::settings::AppConfig;
use crate::infrastructure::encoder::ffmpeg::StreamMerger;
use crate::infrastructure::http::fetcher::AssetFetcher;
use crate::infrastructure::storage::artifacts::ArtifactStore;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: ArtifactStore,
    pub fetcher: AssetFetcher,
    pub merger: Arc<dyn StreamMerger>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: ArtifactStore,
        fetcher: AssetFetcher,
        merger: Arc<dyn StreamMerger>,
    ) -> Self {
        Self {
            config,
            store,
            fetcher,
            merger,
        }
    }
}
