// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload staging for incoming images
//!
//! Every accepted upload is written to the configured upload directory
//! under a timestamp-qualified name before inference runs. Files are
//! never cleaned up; retention is out of scope.

pub mod uploads;

pub use uploads::{sanitize_filename, staged_filename, StagedUpload, UploadError, UploadStore};
