#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use spellingbee_api::{
    config::Config,
    create_router,
    db::init_database,
    models::Difficulty,
    services::{
        catalog_store::{CatalogStore, NewPuzzle},
        AppState,
    },
};
use std::{path::PathBuf, sync::Arc};
use tempfile::TempDir;
use tower::ServiceExt;

/// Smallest byte prefix recognised as a PNG.
pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R',
];

pub struct TestApp {
    pub router: Router,
    pub store: CatalogStore,
    pub images_dir: PathBuf,
    _dir: TempDir,
}

/// Router over a fresh database in a temporary directory, holding `puzzles`.
pub async fn create_test_app(puzzles: &[(&str, Difficulty)]) -> TestApp {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config::for_directory(dir.path());
    std::fs::create_dir_all(&config.images_dir).expect("Failed to create images dir");

    let pool = init_database(&config.database_path)
        .await
        .expect("Failed to open test database");
    let images_dir = config.images_dir.clone();
    let app_state = Arc::new(AppState::new(config, pool));
    let store = app_state.store.clone();

    for (word, difficulty) in puzzles {
        store
            .add_puzzle(&NewPuzzle {
                word: word.to_string(),
                difficulty: *difficulty,
                image_name: format!("{}.jpg", word.to_lowercase()),
                image_description: word.to_lowercase(),
            })
            .await
            .expect("Failed to seed puzzle");
    }

    TestApp {
        router: create_router(app_state),
        store,
        images_dir,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn request(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self
            .request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: &Value) -> (StatusCode, Value) {
        let (status, body) = self
            .request(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self
            .request(
                Request::builder()
                    .method("DELETE")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }
}

/// Multipart body with a single file part.
pub fn multipart_request(uri: &str, field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "spellingbee-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}
