// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP server assembly and shared application state
//!
//! Builds the axum router for the node API. CORS behavior is selected at
//! startup: a permissive tower-http layer, a fixed manual header set, or
//! nothing at all.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::predict::predict_handler;
use crate::config::{CorsMode, NodeConfig};
use crate::detector::WoodDetector;
use crate::storage::UploadStore;
use crate::suggestions::SuggestionTable;
use crate::version::VERSION;

/// Shared state handed to every request handler.
///
/// All capabilities are behind Arc so cloning the state per request is
/// cheap and handlers never contend on anything but the ONNX session.
#[derive(Clone)]
pub struct AppState {
    /// Detection backend (YOLO in production, stubs in tests)
    pub detector: Arc<dyn WoodDetector>,
    /// Staging store for uploaded images
    pub uploads: Arc<UploadStore>,
    /// Species to suggested-use lookup
    pub suggestions: Arc<SuggestionTable>,
}

impl AppState {
    pub fn new(
        detector: Arc<dyn WoodDetector>,
        uploads: Arc<UploadStore>,
        suggestions: Arc<SuggestionTable>,
    ) -> Self {
        Self {
            detector,
            uploads,
            suggestions,
        }
    }
}

/// Response from the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub version: String,
}

/// Builds the application router with the given CORS behavior.
///
/// - `Permissive`: tower-http CorsLayer allowing any origin, method,
///   and header; preflight requests are answered by the layer.
/// - `Manual`: a fixed header set appended to every response, plus an
///   OPTIONS short-circuit on the predict route.
/// - `Disabled`: no CORS headers at all.
///
/// The default request body cap is disabled: upload size is never
/// validated, so photos of any size reach the handler.
pub fn create_app(state: AppState, cors_mode: CorsMode) -> Router {
    let predict_routes = match cors_mode {
        CorsMode::Manual => post(predict_handler).options(predict_preflight),
        _ => post(predict_handler),
    };

    let app = Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Prediction endpoint
        .route("/predict", predict_routes)
        // Upload size is never validated; lift the default 2 MiB cap
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match cors_mode {
        CorsMode::Permissive => app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        ),
        CorsMode::Manual => app.layer(axum::middleware::from_fn(append_cors_headers)),
        CorsMode::Disabled => app,
    }
}

/// Binds the configured address and serves the API until the process
/// is stopped.
pub async fn start_server(config: &NodeConfig, state: AppState) -> Result<()> {
    let app = create_app(state, config.cors_mode);

    let addr = config
        .listen_addr()
        .parse::<SocketAddr>()
        .context(format!("Invalid listen address {}", config.listen_addr()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;

    info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("API server terminated")?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model: state.detector.model_name().to_string(),
        version: VERSION.to_string(),
    })
}

/// OPTIONS short-circuit for manual CORS mode. The middleware below
/// attaches the headers; the body stays empty.
async fn predict_preflight() -> StatusCode {
    StatusCode::OK
}

/// Appends the fixed CORS header set to every response in manual mode.
async fn append_cors_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type,Authorization"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,PUT,POST,DELETE,OPTIONS"),
    );

    response
}
