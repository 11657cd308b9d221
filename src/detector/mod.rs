// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Wood species detection.
//!
//! The [`WoodDetector`] trait abstracts over the detection backend so the
//! HTTP layer can be tested without model files. The production
//! implementation is [`YoloWoodModel`], which runs an exported YOLO
//! network through ONNX Runtime.

pub mod yolo;

use std::path::Path;

use thiserror::Error;

pub use yolo::{YoloParams, YoloWoodModel};

/// Class names used when no class list file is configured.
pub const DEFAULT_CLASS_NAMES: &[&str] = &["mahogany", "narra", "oak"];

/// Errors surfaced by a detection backend.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: String,
        source: image::ImageError,
    },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Unexpected model output shape: {0}")]
    OutputShape(String),
}

/// A single detected wood sample in pixel coordinates of the original image.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    /// Confidence score in [0, 1].
    pub confidence: f32,
    /// Index into the detector's class name list.
    pub class_id: usize,
}

impl Detection {
    /// Intersection-over-union with another box.
    pub fn iou(&self, other: &Detection) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let area_a = (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0);
        let area_b = (other.x2 - other.x1).max(0.0) * (other.y2 - other.y1).max(0.0);
        let union = area_a + area_b - inter;

        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }
}

/// Detection backend used by the predict endpoint.
///
/// Implementations must return detections sorted by descending confidence,
/// so index 0 is always the strongest detection.
pub trait WoodDetector: Send + Sync {
    /// Run detection on the image at `image_path`.
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>, DetectorError>;

    /// Class names in class id order.
    fn class_names(&self) -> &[String];

    /// Model name reported by the health endpoint.
    fn model_name(&self) -> &str;

    /// Resolve a class id to its name, if the id is known.
    fn label(&self, class_id: usize) -> Option<&str> {
        self.class_names().get(class_id).map(String::as_str)
    }
}

/// Load class names from a text file, one name per line.
///
/// Blank lines and surrounding whitespace are ignored.
pub fn load_class_names(path: &Path) -> anyhow::Result<Vec<String>> {
    use anyhow::Context;

    let contents = std::fs::read_to_string(path)
        .context(format!("Failed to read class list from {}", path.display()))?;

    let names: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if names.is_empty() {
        anyhow::bail!("Class list at {} contains no names", path.display());
    }

    Ok(names)
}

/// The built-in class list as owned strings.
pub fn default_class_names() -> Vec<String> {
    DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect()
}
