// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod http_server;
pub mod predict;

pub use errors::ApiError;
pub use http_server::{create_app, start_server, AppState, HealthResponse};
pub use predict::{predict_handler, PredictResponse};
