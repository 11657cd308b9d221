// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Health endpoint tests

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt;
use woodscan_node::{
    api::{create_app, AppState},
    config::CorsMode,
    detector::{Detection, DetectorError, WoodDetector},
    storage::UploadStore,
    suggestions::SuggestionTable,
    version::VERSION,
};

struct IdleDetector;

impl WoodDetector for IdleDetector {
    fn detect(&self, _image_path: &Path) -> Result<Vec<Detection>, DetectorError> {
        Ok(vec![])
    }

    fn class_names(&self) -> &[String] {
        &[]
    }

    fn model_name(&self) -> &str {
        "wood-detect"
    }
}

async fn setup_state() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let uploads = UploadStore::new(dir.path()).await.unwrap();
    let state = AppState::new(
        Arc::new(IdleDetector),
        Arc::new(uploads),
        Arc::new(SuggestionTable::new()),
    );
    (state, dir)
}

/// Test 1: Health reports status, model name, and build version.
#[tokio::test]
async fn test_health_returns_healthy() {
    let (state, _dir) = setup_state().await;
    let app = create_app(state, CorsMode::Permissive);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "wood-detect");
    assert_eq!(body["version"], VERSION);
}

/// Test 2: Health only answers GET.
#[tokio::test]
async fn test_health_rejects_post() {
    let (state, _dir) = setup_state().await;
    let app = create_app(state, CorsMode::Permissive);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
