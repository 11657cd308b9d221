// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! API error types and their JSON representations

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::detector::DetectorError;
use crate::storage::UploadError;

/// Errors surfaced by the prediction endpoint.
///
/// The missing-image case keeps the legacy one-field body
/// `{"error": "No image uploaded"}` that existing clients match on.
/// Server-side failures carry an error code plus a human-readable message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No image uploaded")]
    MissingImage,

    #[error("Failed to store upload: {0}")]
    Upload(#[from] UploadError),

    #[error("Inference failed: {0}")]
    Detector(#[from] DetectorError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingImage => StatusCode::BAD_REQUEST,
            ApiError::Upload(_) | ApiError::Detector(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::MissingImage => json!({
                "error": "No image uploaded",
            }),
            ApiError::Upload(e) => json!({
                "error": "upload_failed",
                "message": e.to_string(),
            }),
            ApiError::Detector(e) => json!({
                "error": "inference_failed",
                "message": e.to_string(),
            }),
        };

        (self.status_code(), Json(body)).into_response()
    }
}
