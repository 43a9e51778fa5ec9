//! Shared fixtures for server API tests
//!
//! Each test server gets its own temp music tree and data root (with an
//! on-disk SQLite catalog), plus a router wired to real state.

#![allow(dead_code)]

use aria_server::{config::ServerConfig, create_router, services::renderers::RendererRegistry, AppState};
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestServer {
    pub state: AppState,
    pub router: Router,
    /// Parent dir: the music root is `<parent>/music`, so tests can place
    /// files *outside* the library for containment checks
    pub parent: TempDir,
    _data: TempDir,
}

impl TestServer {
    pub async fn new() -> Self {
        let parent = tempfile::tempdir().expect("Failed to create temp dir");
        let data = tempfile::tempdir().expect("Failed to create data dir");
        let music_path = parent.path().join("music");
        std::fs::create_dir_all(&music_path).unwrap();

        let mut config = ServerConfig::default();
        config.library.music_path = music_path;
        config.library.data_path = data.path().to_path_buf();
        config.library.index_on_startup = false;
        config.stream.host_ip = "127.0.0.1".to_string();

        let pool = aria_storage::create_pool(&config.database_url())
            .await
            .expect("Failed to create pool");
        aria_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(pool, config, Arc::new(RendererRegistry::new()));
        let router = create_router(state.clone());

        Self {
            state,
            router,
            parent,
            _data: data,
        }
    }

    pub fn music_root(&self) -> std::path::PathBuf {
        self.state.config.library.music_path.clone()
    }

    /// Place a file under the music root
    pub fn add_music_file(&self, rel_path: &str, contents: &[u8]) {
        let path = self.music_root().join(rel_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    /// Place a WAV file under the music root
    pub fn add_wav(&self, rel_path: &str, seconds: u32) {
        let path = self.music_root().join(rel_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        write_wav(&path, seconds);
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn get_with_range(&self, uri: &str, range: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header("Range", range)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn request_json(&self, method: &str, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn request_empty(&self, method: &str, uri: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }
}

/// Collect a response body into bytes
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Collect a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

/// Write a valid mono 16-bit PCM WAV file of roughly `seconds` seconds.
pub fn write_wav(path: &Path, seconds: u32) {
    let sample_rate: u32 = 8000;
    let byte_rate: u32 = sample_rate * 2;
    let data_len: u32 = byte_rate * seconds;

    let mut buf = Vec::with_capacity(44 + data_len as usize);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    buf.resize(44 + data_len as usize, 0);

    std::fs::write(path, buf).expect("failed to write test wav");
}
