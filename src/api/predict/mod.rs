// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Predict API endpoint module
//!
//! Provides POST /predict for detecting wood species in uploaded images.

pub mod handler;
pub mod response;

pub use handler::predict_handler;
pub use response::PredictResponse;
