// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Predict response types

use serde::{Deserialize, Serialize};

/// Response from the prediction endpoint.
///
/// Both variants serialize without a tag, reproducing the two payload
/// shapes clients already parse:
///
/// - detection: `{"predicted_class": "oak", "confidence": 0.87,
///   "suggested_use": "Flooring, tables, chairs"}`
/// - no detection: `{"error": "no_wood_detected", "predicted_class": null,
///   "confidence": 0, "suggested_use": "No wood detected"}`
///
/// The no-detection `confidence` is an integer zero, not `0.0`, which is
/// why the variant carries a `u32`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PredictResponse {
    Detected {
        predicted_class: String,
        confidence: f64,
        suggested_use: String,
    },
    NoDetection {
        error: String,
        predicted_class: Option<String>,
        confidence: u32,
        suggested_use: String,
    },
}

impl PredictResponse {
    /// Builds the success payload for the strongest detection.
    pub fn detected(predicted_class: &str, confidence: f32, suggested_use: &str) -> Self {
        PredictResponse::Detected {
            predicted_class: predicted_class.to_string(),
            confidence: round_confidence(confidence),
            suggested_use: suggested_use.to_string(),
        }
    }

    /// Builds the fixed payload returned when no box survives thresholding.
    pub fn no_detection() -> Self {
        PredictResponse::NoDetection {
            error: "no_wood_detected".to_string(),
            predicted_class: None,
            confidence: 0,
            suggested_use: "No wood detected".to_string(),
        }
    }
}

/// Rounds a model confidence to two decimal places for the payload.
pub fn round_confidence(confidence: f32) -> f64 {
    (confidence as f64 * 100.0).round() / 100.0
}
