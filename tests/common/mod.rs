//! Shared harness: a router wired to a temp storage dir, a wiremock server
//! standing in for the remote asset host, and a fake encoder.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use media_merge::app::create_app;
use media_merge::config::settings::AppConfig;
use media_merge::infrastructure::encoder::ffmpeg::{MergeError, StreamMerger};
use media_merge::infrastructure::http::fetcher::AssetFetcher;
use media_merge::infrastructure::storage::artifacts::{ArtifactStore, JobPaths};
use media_merge::state::AppState;

pub const PUBLIC_BASE: &str = "http://media.test/";
pub const OUTPUT_SIZE: usize = 200_003;

/// Deterministic, non-repeating-looking payload for fixture files.
pub fn fixture_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + i / 251) % 256) as u8).collect()
}

#[derive(Clone, Copy)]
pub enum FakeOutcome {
    /// Writes an output of this many bytes.
    Output(usize),
    /// Leaves a partial output behind and reports encoder failure.
    Fail(&'static str),
}

pub struct FakeMerger {
    outcome: FakeOutcome,
}

#[async_trait]
impl StreamMerger for FakeMerger {
    async fn merge_streams(&self, paths: &JobPaths) -> Result<PathBuf, MergeError> {
        for input in [&paths.video_input, &paths.audio_input] {
            if !input.exists() {
                return Err(MergeError::Failed {
                    exit_code: Some(1),
                    stderr: format!("{}: No such file or directory", input.display()),
                });
            }
        }

        match self.outcome {
            FakeOutcome::Output(len) => {
                tokio::fs::write(&paths.output, fixture_bytes(len))
                    .await
                    .expect("write fixture output");
                Ok(paths.output.clone())
            }
            FakeOutcome::Fail(stderr) => {
                tokio::fs::write(&paths.output, b"partial")
                    .await
                    .expect("write partial output");
                Err(MergeError::Failed {
                    exit_code: Some(1),
                    stderr: stderr.to_string(),
                })
            }
        }
    }
}

pub struct TestHarness {
    pub dir: TempDir,
    pub assets: MockServer,
    pub store: ArtifactStore,
    pub app: Router,
}

impl TestHarness {
    pub async fn new(outcome: FakeOutcome) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let assets = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/video.mp4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "video/mp4")
                    .set_body_bytes(fixture_bytes(5_000)),
            )
            .mount(&assets)
            .await;
        Mock::given(method("GET"))
            .and(path("/audio.wav"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/wav")
                    .set_body_bytes(fixture_bytes(2_000)),
            )
            .mount(&assets)
            .await;
        Mock::given(method("GET"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<!doctype html><p>Sign in</p>", "text/html; charset=utf-8"),
            )
            .mount(&assets)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone.wav"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&assets)
            .await;

        let config = AppConfig {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            storage_dir: dir.path().to_path_buf(),
            public_base_url: Url::parse(PUBLIC_BASE).unwrap(),
            ffmpeg_bin: "ffmpeg".to_string(),
            min_output_bytes: 10_000,
            stream_chunk_bytes: 4096,
        };

        let store = ArtifactStore::new(dir.path());
        let state = AppState::new(
            config,
            store.clone(),
            AssetFetcher::new().expect("build fetcher"),
            Arc::new(FakeMerger { outcome }),
        );

        Self {
            dir,
            assets,
            store,
            app: create_app(state),
        }
    }

    pub fn asset_url(&self, name: &str) -> String {
        format!("{}/{}", self.assets.uri(), name)
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body.to_vec())
    }

    pub async fn submit(&self, video_url: &str, audio_url: &str) -> (StatusCode, serde_json::Value) {
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("video_url", video_url)
            .append_pair("audio_url", audio_url)
            .finish();
        self.submit_raw(form).await
    }

    pub async fn submit_raw(&self, form: String) -> (StatusCode, serde_json::Value) {
        let req = Request::post("/api/v1/merge")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();
        let (status, _, body) = self.send(req).await;
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    /// Submits the default video/audio pair and returns the job id.
    pub async fn merged_job(&self) -> String {
        let (status, json) = self
            .submit(&self.asset_url("video.mp4"), &self.asset_url("audio.wav"))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["data"]["job_id"].as_str().unwrap().to_string()
    }

    pub async fn download(&self, job_id: &str, range: Option<&str>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let mut req = Request::get(format!("/api/v1/jobs/{job_id}/download"));
        if let Some(range) = range {
            req = req.header("range", range);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn probe(&self, job_id: &str) -> (StatusCode, HeaderMap, Vec<u8>) {
        let req = Request::head(format!("/api/v1/jobs/{job_id}/download"))
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
