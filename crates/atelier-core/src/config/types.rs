//! Sub-configuration structs with defaults matching the production storefront.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Object storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory of the local disk backend
    pub root: PathBuf,

    /// URL prefix under which the storage root is served
    pub public_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("~/.atelier/storage"),
            public_url: "/storage".to_string(),
        }
    }
}

/// Resource limits applied at intake and decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum number of files per upload batch
    pub max_batch_files: usize,

    /// Maximum size of a single file in megabytes
    pub max_file_size_mb: u64,

    /// Maximum decoded image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl LimitsConfig {
    /// Per-file size limit in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_batch_files: 10,
            max_file_size_mb: 5,
            max_image_dimension: 12000,
            decode_timeout_ms: 10000,
        }
    }
}

/// Target box and encode quality of one variant.
///
/// The resize mode is not configurable: it is fixed per variant kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantBox {
    pub width: u32,
    pub height: u32,
    /// JPEG quality (1-100)
    pub quality: u8,
}

/// Settings for the three derived variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantsConfig {
    /// Capped original, aspect preserved
    pub original: VariantBox,

    /// Medium display size, aspect preserved
    pub medium: VariantBox,

    /// Square thumbnail, cropped to fill
    pub thumb: VariantBox,
}

impl Default for VariantsConfig {
    fn default() -> Self {
        Self {
            original: VariantBox {
                width: 2000,
                height: 2000,
                quality: 85,
            },
            medium: VariantBox {
                width: 800,
                height: 800,
                quality: 80,
            },
            thumb: VariantBox {
                width: 400,
                height: 400,
                quality: 75,
            },
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
