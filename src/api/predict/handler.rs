// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Predict endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use tracing::{debug, info, warn};

use super::response::PredictResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// POST /predict - Detect wood species in an uploaded image
///
/// Accepts a multipart form with an `image` file field, stages the file
/// into the upload directory under a timestamped name, and runs the
/// detector over the staged copy.
///
/// # Request
/// - `image`: Image file part (required; the part must carry a filename)
///
/// # Response
/// - `predicted_class`: Species label of the strongest detection
/// - `confidence`: Detection confidence rounded to two decimals
/// - `suggested_use`: Suggested applications for the species
///
/// When no detection clears the confidence threshold the endpoint still
/// returns 200 with the fixed no-detection payload.
///
/// # Errors
/// - 400 Bad Request: No usable `image` file field in the form
/// - 500 Internal Server Error: Upload staging or inference failed
pub async fn predict_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    debug!("Predict request received");

    // 1. Reject non-multipart requests with the legacy missing-image body
    let Ok(mut multipart) = multipart else {
        warn!("Predict request is not multipart/form-data");
        return Err(ApiError::MissingImage);
    };

    // 2. Walk the form for the image file field
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Malformed multipart body: {}", e);
        ApiError::MissingImage
    })? {
        if field.name() != Some("image") {
            continue;
        }

        // A bare value under the image key is a form field, not a file
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let data = field.bytes().await.map_err(|e| {
            warn!("Failed to read image field: {}", e);
            ApiError::MissingImage
        })?;

        upload = Some((filename, data));
        break;
    }

    let (filename, data) = upload.ok_or(ApiError::MissingImage)?;

    debug!("Received image '{}' ({} bytes)", filename, data.len());

    // 3. Stage the upload to disk under a timestamped name
    let staged = state.uploads.stage(&filename, &data).await?;

    info!("Image staged at {}", staged.path.display());

    // 4. Run detection on the staged file
    let detections = state.detector.detect(&staged.path)?;

    // 5. Detections are sorted strongest-first; answer with the top one
    let Some(top) = detections.first() else {
        info!("No wood detected in {}", staged.filename);
        return Ok(Json(PredictResponse::no_detection()));
    };

    let label = state.detector.label(top.class_id).unwrap_or("unknown");
    let suggestion = state.suggestions.suggest(label);

    info!(
        "Detected {} ({:.2} confidence) in {}",
        label, top.confidence, staged.filename
    );

    // 6. Build the client payload
    Ok(Json(PredictResponse::detected(
        label,
        top.confidence,
        suggestion,
    )))
}
