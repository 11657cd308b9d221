// Version information for the WoodScan Node

/// Full version string with feature description
pub const VERSION: &str = "v1.2.0-cors-modes-2025-08-19";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.2.0";

/// Build date
pub const BUILD_DATE: &str = "2025-08-19";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "multipart-upload",
    "onnx-detection",
    "suggestion-table",
    "cors-permissive",
    "cors-manual",
    "health-endpoint",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("WoodScan Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
