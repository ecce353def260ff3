//! Classifier and viewer options.

use serde::{Deserialize, Serialize};

/// Options for [`classify`](crate::classify).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyOptions {
    /// Try the embedded document decode for every text payload, not only for
    /// those whose MIME type or file name suggests a bundle.
    pub attempt_bundle_decode: bool,
}

/// Viewer behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Reconstruct a file as soon as its reference is resolved. When off, only
    /// the reference metadata is shown until reconstruction is requested.
    pub auto_start: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self { auto_start: true }
    }
}
