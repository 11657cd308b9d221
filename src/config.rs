// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Runtime configuration loaded from environment variables
//!
//! Every option has a default so the node starts with no configuration
//! at all. A `.env` file is honored when present (loaded in main).

use std::env;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// How CORS headers are attached to API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorsMode {
    /// Blanket allow-all CORS via tower-http's CorsLayer
    Permissive,
    /// Fixed header set appended to every response, plus an OPTIONS
    /// short-circuit on the predict route
    Manual,
    /// No CORS headers at all
    Disabled,
}

impl CorsMode {
    /// Parses a mode name. Unrecognized values fall back to `Permissive`
    /// with a warning so a typo never strands browser clients.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "permissive" => CorsMode::Permissive,
            "manual" => CorsMode::Manual,
            "disabled" => CorsMode::Disabled,
            other => {
                warn!("Unknown CORS_MODE '{}', using permissive", other);
                CorsMode::Permissive
            }
        }
    }
}

/// Node configuration assembled from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Interface the API server binds to (API_HOST)
    pub api_host: String,
    /// Port the API server listens on (API_PORT)
    pub api_port: u16,
    /// Directory uploaded images are staged into (UPLOAD_DIR)
    pub upload_dir: String,
    /// Path to the exported ONNX detection model (MODEL_PATH)
    pub model_path: String,
    /// Optional newline-separated class list file (CLASS_LIST_PATH)
    pub class_list_path: Option<String>,
    /// Minimum class confidence for a detection to count (CONFIDENCE_THRESHOLD)
    pub confidence_threshold: f32,
    /// IoU threshold for non-maximum suppression (IOU_THRESHOLD)
    pub iou_threshold: f32,
    /// CORS behavior for the API (CORS_MODE)
    pub cors_mode: CorsMode,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 5000,
            upload_dir: "uploads".to_string(),
            model_path: "./models/wood-detect.onnx".to_string(),
            class_list_path: None,
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            cors_mode: CorsMode::Permissive,
        }
    }
}

impl NodeConfig {
    /// Reads configuration from the environment, using defaults for
    /// anything unset. Malformed numeric values fall back to their
    /// default with a warning instead of aborting startup.
    pub fn from_env() -> Self {
        let defaults = NodeConfig::default();

        Self {
            api_host: env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port: parse_var("API_PORT", defaults.api_port),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or(defaults.upload_dir),
            model_path: env::var("MODEL_PATH").unwrap_or(defaults.model_path),
            class_list_path: env::var("CLASS_LIST_PATH").ok(),
            confidence_threshold: parse_var("CONFIDENCE_THRESHOLD", defaults.confidence_threshold),
            iou_threshold: parse_var("IOU_THRESHOLD", defaults.iou_threshold),
            cors_mode: env::var("CORS_MODE")
                .map(|value| CorsMode::parse(&value))
                .unwrap_or(defaults.cors_mode),
        }
    }

    /// Socket address string the API server binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Invalid {} '{}', using default {}", name, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
