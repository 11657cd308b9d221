// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! YOLO wood species detector backed by ONNX Runtime
//!
//! This module wraps an exported YOLO detection model and provides:
//! - ONNX model loading from disk (CPU execution provider)
//! - NCHW tensor preprocessing with [0, 1] normalization
//! - Raw output decoding for the [1, 4 + classes, boxes] layout
//! - Per-class non-maximum suppression
//! - Detections sorted strongest-first

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use image::DynamicImage;
use ndarray::{Array, ArrayD};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use tracing::{debug, info};

use super::{Detection, DetectorError, WoodDetector};

/// Inference parameters for the YOLO detection head.
#[derive(Debug, Clone)]
pub struct YoloParams {
    /// Square input resolution the model was exported with (640 typical)
    pub input_size: u32,
    /// Minimum class confidence for a box to survive decoding, 0..1
    pub confidence_threshold: f32,
    /// IoU threshold for non-maximum suppression, 0..1
    pub iou_threshold: f32,
    /// Upper bound on detections returned per image
    pub max_detections: usize,
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 100,
        }
    }
}

/// ONNX-based YOLO wood detector
///
/// # Model Details
/// - Input: RGB image tensor, NCHW, normalized to [0, 1]
/// - Output: [1, 4 + num_classes, num_boxes] prediction tensor
/// - Provider: CPU (ONNX Runtime)
///
/// # Thread Safety
/// The session is wrapped in Arc<Mutex> for thread-safe shared access;
/// clones share the same underlying session.
#[derive(Clone)]
pub struct YoloWoodModel {
    /// ONNX Runtime session (wrapped in Arc<Mutex> for thread-safe shared access)
    session: Arc<Mutex<Session>>,

    /// Class names in class id order
    class_names: Vec<String>,

    /// Decoding and suppression parameters
    params: YoloParams,

    /// Model name derived from the file stem (e.g. "wood-detect")
    model_name: String,
}

impl std::fmt::Debug for YoloWoodModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloWoodModel")
            .field("model_name", &self.model_name)
            .field("class_names", &self.class_names)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl YoloWoodModel {
    /// Loads a YOLO detection model from an ONNX file.
    ///
    /// # Arguments
    /// - `model_path`: Path to the exported ONNX model
    /// - `class_names`: Class names in the order the model was trained with
    /// - `params`: Decoding thresholds and input size
    ///
    /// # Errors
    /// Returns error if the model file is missing, the class list is empty,
    /// or ONNX Runtime fails to initialize the session.
    pub fn load<P: AsRef<Path>>(
        model_path: P,
        class_names: Vec<String>,
        params: YoloParams,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if class_names.is_empty() {
            anyhow::bail!("Detector requires at least one class name");
        }

        info!(
            "Loading YOLO wood detection model from {}",
            model_path.display()
        );

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load ONNX model from {}",
                model_path.display()
            ))?;

        let model_name = model_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "wood-detect".to_string());

        info!(
            "YOLO model '{}' loaded ({} classes: {})",
            model_name,
            class_names.len(),
            class_names.join(", ")
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            class_names,
            params,
            model_name,
        })
    }

    /// Returns the decoding parameters in use.
    pub fn params(&self) -> &YoloParams {
        &self.params
    }
}

impl WoodDetector for YoloWoodModel {
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>, DetectorError> {
        let img = image::open(image_path).map_err(|e| DetectorError::ImageRead {
            path: image_path.display().to_string(),
            source: e,
        })?;
        let (img_width, img_height) = (img.width(), img.height());

        debug!(
            "Running detection on {} ({}x{})",
            image_path.display(),
            img_width,
            img_height
        );

        let input = image_to_tensor(&img, self.params.input_size)?;

        // Run inference (ort 2.0 API) - lock session for thread-safe access
        let mut session_guard = self.session.lock().unwrap();
        let outputs = session_guard
            .run(ort::inputs![
                "images" => Value::from_array(input)
                    .map_err(|e| DetectorError::Inference(e.to_string()))?
            ])
            .map_err(|e| DetectorError::Inference(e.to_string()))?;

        // Extract output tensor (ort 2.0 API)
        // Use index [0] instead of name since exports differ in output naming
        let output = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| DetectorError::Inference(e.to_string()))?
            .to_owned();

        let detections = decode_predictions(&output, &self.params, img_width, img_height)?;

        debug!(
            "{} detections above threshold for {}",
            detections.len(),
            image_path.display()
        );

        Ok(detections)
    }

    fn class_names(&self) -> &[String] {
        &self.class_names
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Converts an image into a normalized NCHW input tensor of shape
/// [1, 3, size, size]. The image is stretched to the target square;
/// decoded boxes are scaled back by the inverse ratio.
pub fn image_to_tensor(
    img: &DynamicImage,
    target_size: u32,
) -> Result<ArrayD<f32>, DetectorError> {
    let rgb_img = img.to_rgb8();
    let resized = image::imageops::resize(
        &rgb_img,
        target_size,
        target_size,
        image::imageops::FilterType::Triangle,
    );

    let mut input_data = Vec::with_capacity((3 * target_size * target_size) as usize);

    // Fill in NCHW order: batch, channel, height, width
    for c in 0..3 {
        for y in 0..target_size {
            for x in 0..target_size {
                let pixel = resized.get_pixel(x, y);
                input_data.push(pixel[c] as f32 / 255.0);
            }
        }
    }

    Array::from_shape_vec(
        ndarray::IxDyn(&[1, 3, target_size as usize, target_size as usize]),
        input_data,
    )
    .map_err(|e| DetectorError::Inference(format!("Failed to build input tensor: {}", e)))
}

/// Decodes a raw YOLO output tensor into detections in original-image
/// pixel coordinates, applies per-class NMS, and sorts strongest-first.
pub fn decode_predictions(
    output: &ArrayD<f32>,
    params: &YoloParams,
    img_width: u32,
    img_height: u32,
) -> Result<Vec<Detection>, DetectorError> {
    // Output shape should be [1, num_classes + 4, num_boxes]
    let shape = output.shape();
    if shape.len() != 3 {
        return Err(DetectorError::OutputShape(format!(
            "expected 3 dimensions, got {:?}",
            shape
        )));
    }
    if shape[1] <= 4 {
        return Err(DetectorError::OutputShape(format!(
            "expected at least one class channel, got {:?}",
            shape
        )));
    }

    let num_classes = shape[1] - 4;
    let num_boxes = shape[2];

    let scale_x = img_width as f32 / params.input_size as f32;
    let scale_y = img_height as f32 / params.input_size as f32;

    let mut detections = Vec::new();

    for i in 0..num_boxes {
        // Box coordinates come first: center x, center y, width, height
        let x_center = output[[0, 0, i]];
        let y_center = output[[0, 1, i]];
        let width = output[[0, 2, i]];
        let height = output[[0, 3, i]];

        // Find the class with highest confidence
        let mut max_confidence = 0.0;
        let mut best_class_id = 0;
        for class_idx in 0..num_classes {
            let class_confidence = output[[0, 4 + class_idx, i]];
            if class_confidence > max_confidence {
                max_confidence = class_confidence;
                best_class_id = class_idx;
            }
        }

        if max_confidence > params.confidence_threshold {
            // Convert from center coordinates to corner coordinates,
            // scaled back to original image size
            detections.push(Detection {
                x1: (x_center - width / 2.0) * scale_x,
                y1: (y_center - height / 2.0) * scale_y,
                x2: (x_center + width / 2.0) * scale_x,
                y2: (y_center + height / 2.0) * scale_y,
                confidence: max_confidence,
                class_id: best_class_id,
            });
        }
    }

    let mut kept = nms(detections, params.iou_threshold);

    // Strongest detection first, so callers can treat index 0 as the answer
    kept.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    kept.truncate(params.max_detections);

    Ok(kept)
}

/// Non-maximum suppression, applied separately per class so boxes of
/// different species never suppress each other.
pub fn nms(detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    if detections.is_empty() {
        return detections;
    }

    let mut class_groups: HashMap<usize, Vec<Detection>> = HashMap::new();
    for detection in detections {
        class_groups
            .entry(detection.class_id)
            .or_default()
            .push(detection);
    }

    let mut all_results = Vec::new();

    for (_, mut class_detections) in class_groups {
        class_detections.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut suppressed = vec![false; class_detections.len()];

        for i in 0..class_detections.len() {
            if suppressed[i] {
                continue;
            }

            for j in (i + 1)..class_detections.len() {
                if !suppressed[j] && class_detections[i].iou(&class_detections[j]) > iou_threshold
                {
                    suppressed[j] = true;
                }
            }

            all_results.push(class_detections[i].clone());
        }
    }

    all_results
}
