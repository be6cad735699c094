use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use media_merge::app;
use media_merge::config::settings::AppConfig;
use media_merge::infrastructure::encoder::ffmpeg::FfmpegMerger;
use media_merge::infrastructure::http::fetcher::AssetFetcher;
use media_merge::infrastructure::storage::artifacts::ArtifactStore;
use media_merge::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    info!("Starting server...");

    let config = AppConfig::new().context("Invalid configuration")?;

    let store = ArtifactStore::new(&config.storage_dir);
    store.init().await.with_context(|| {
        format!("Failed to create storage dir {}", config.storage_dir.display())
    })?;
    info!("✅ Artifacts stored under {}", config.storage_dir.display());

    let fetcher = AssetFetcher::new().context("Failed to build HTTP client")?;
    let merger = Arc::new(FfmpegMerger::new(&config.ffmpeg_bin));

    let addr = config.bind_addr();
    let state = AppState::new(config, store, fetcher, merger);
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
