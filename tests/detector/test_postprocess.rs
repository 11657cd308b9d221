// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Decode and suppression pipeline tests on synthetic model output
//!
//! No model files are required here; tensors are built by hand in the
//! [1, 4 + classes, boxes] layout the YOLO export produces.

use ndarray::{Array, ArrayD};
use woodscan_node::detector::yolo::{decode_predictions, nms, YoloParams};
use woodscan_node::detector::Detection;

/// Builds a [1, 4 + num_classes, num_boxes] tensor from per-box columns
/// of [xc, yc, w, h, class scores...].
fn tensor_from_columns(num_classes: usize, columns: &[Vec<f32>]) -> ArrayD<f32> {
    let channels = 4 + num_classes;
    let num_boxes = columns.len();
    let mut data = vec![0.0f32; channels * num_boxes];
    for (i, column) in columns.iter().enumerate() {
        assert_eq!(column.len(), channels);
        for (c, &value) in column.iter().enumerate() {
            data[c * num_boxes + i] = value;
        }
    }
    Array::from_shape_vec(ndarray::IxDyn(&[1, channels, num_boxes]), data).unwrap()
}

fn boxed(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32, class_id: usize) -> Detection {
    Detection {
        x1,
        y1,
        x2,
        y2,
        confidence,
        class_id,
    }
}

/// Test 1: The full decode pipeline keeps distinct boxes of both
/// species, suppresses the overlapping duplicate, and sorts the
/// survivors strongest-first.
#[test]
fn test_decode_pipeline_on_mixed_tensor() {
    let output = tensor_from_columns(
        2,
        &[
            // Strong mahogany box
            vec![100.0, 100.0, 80.0, 80.0, 0.85, 0.05],
            // Overlapping weaker mahogany duplicate, should be suppressed
            vec![104.0, 104.0, 80.0, 80.0, 0.60, 0.05],
            // Distinct narra box elsewhere in the frame
            vec![400.0, 400.0, 60.0, 60.0, 0.02, 0.70],
            // Background noise below threshold
            vec![500.0, 100.0, 30.0, 30.0, 0.10, 0.12],
        ],
    );

    let detections = decode_predictions(&output, &YoloParams::default(), 640, 640).unwrap();

    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0].class_id, 0);
    assert!((detections[0].confidence - 0.85).abs() < 1e-6);
    assert_eq!(detections[1].class_id, 1);
    assert!((detections[1].confidence - 0.70).abs() < 1e-6);
}

/// Test 2: Raising the confidence threshold drops weaker boxes.
#[test]
fn test_decode_respects_custom_threshold() {
    let output = tensor_from_columns(
        1,
        &[
            vec![100.0, 100.0, 40.0, 40.0, 0.40],
            vec![300.0, 300.0, 40.0, 40.0, 0.80],
        ],
    );
    let params = YoloParams {
        confidence_threshold: 0.5,
        ..YoloParams::default()
    };

    let detections = decode_predictions(&output, &params, 640, 640).unwrap();

    assert_eq!(detections.len(), 1);
    assert!((detections[0].confidence - 0.80).abs() < 1e-6);
}

/// Test 3: NMS keeps one box per overlapping same-class cluster and
/// leaves separated boxes alone.
#[test]
fn test_nms_keeps_strongest_per_cluster() {
    let detections = vec![
        boxed(10.0, 10.0, 50.0, 50.0, 0.9, 0),
        boxed(12.0, 12.0, 52.0, 52.0, 0.7, 0),
        boxed(11.0, 11.0, 51.0, 51.0, 0.6, 0),
        boxed(200.0, 200.0, 240.0, 240.0, 0.5, 0),
    ];

    let mut kept = nms(detections, 0.45);
    kept.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());

    assert_eq!(kept.len(), 2);
    assert!((kept[0].confidence - 0.9).abs() < 1e-6);
    assert!((kept[1].confidence - 0.5).abs() < 1e-6);
}

/// Test 4: IoU is symmetric and full containment scores by area ratio.
#[test]
fn test_iou_symmetry_and_containment() {
    let outer = boxed(0.0, 0.0, 100.0, 100.0, 0.9, 0);
    let inner = boxed(25.0, 25.0, 75.0, 75.0, 0.8, 0);

    assert!((outer.iou(&inner) - inner.iou(&outer)).abs() < 1e-6);
    // Inner area 2500, outer area 10000, intersection is the inner box
    assert!((outer.iou(&inner) - 0.25).abs() < 1e-6);
}
