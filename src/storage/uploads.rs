// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Filesystem store for uploaded images

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;
use tokio::fs;

/// Errors raised while staging an upload to disk
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to create upload directory {dir}: {source}")]
    CreateDir {
        dir: String,
        source: std::io::Error,
    },

    #[error("Failed to write upload {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// An upload staged to durable storage
#[derive(Debug, Clone)]
pub struct StagedUpload {
    /// Full path of the staged file
    pub path: PathBuf,
    /// Constructed filename (timestamp prefix + sanitized name)
    pub filename: String,
}

/// Strip a client-supplied filename down to a safe basename.
///
/// Path separators become spaces, whitespace runs join with `_`,
/// characters outside `[A-Za-z0-9_.-]` are dropped, and leading or
/// trailing dots and underscores are trimmed. A name with nothing safe
/// left sanitizes to the empty string.
pub fn sanitize_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Build the staged filename for an upload received at `at`.
///
/// The prefix has second resolution, so two uploads with the same
/// original name within the same wall-clock second produce the same
/// staged name and the later write wins.
pub fn staged_filename(original: &str, at: DateTime<Local>) -> String {
    format!(
        "{}_{}",
        at.format("%Y%m%d_%H%M%S"),
        sanitize_filename(original)
    )
}

/// Store that stages uploads under a single directory.
///
/// The directory is created at construction time (process startup).
/// Staged files are never read back or deleted by the node.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create the store, creating the upload directory if absent
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, UploadError> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .await
                .map_err(|source| UploadError::CreateDir {
                    dir: dir.display().to_string(),
                    source,
                })?;
        }
        Ok(Self { dir })
    }

    /// Upload directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write uploaded bytes under a timestamp-qualified safe name.
    ///
    /// Bytes are written verbatim; no transcoding or validation.
    pub async fn stage(&self, original: &str, bytes: &[u8]) -> Result<StagedUpload, UploadError> {
        let filename = staged_filename(original, Local::now());
        let path = self.dir.join(&filename);

        fs::write(&path, bytes)
            .await
            .map_err(|source| UploadError::Write {
                path: path.display().to_string(),
                source,
            })?;

        Ok(StagedUpload { path, filename })
    }
}
