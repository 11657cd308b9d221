// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod detector;
pub mod storage;
pub mod suggestions;
pub mod version;

// Re-export main types
pub use api::{create_app, start_server, ApiError, AppState, PredictResponse};
pub use config::{CorsMode, NodeConfig};
pub use detector::{Detection, DetectorError, WoodDetector, YoloParams, YoloWoodModel};
pub use storage::{StagedUpload, UploadError, UploadStore};
pub use suggestions::SuggestionTable;
