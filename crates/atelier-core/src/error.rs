//! Error types for the Atelier photo pipeline and gallery registry.
//!
//! Errors are organized by stage so that callers can apply the propagation
//! policy directly: validation and authorization errors abort a request before
//! any side effect, while per-file pipeline and storage errors are isolated to
//! the file that caused them.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{AtelierId, PhotoId, ProductId, UserId};

/// Top-level error type for Atelier operations.
#[derive(Error, Debug)]
pub enum AtelierError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request rejected before any processing
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Object storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Gallery registry errors (authorization, lookups)
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Intake validation failures. Any of these rejects the whole request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No files were submitted
    #[error("At least one photo is required")]
    EmptyBatch,

    /// More files than the batch limit
    #[error("Too many photos: {count} > {max}")]
    TooManyFiles { count: usize, max: usize },

    /// Declared MIME type is not an accepted image type
    #[error("Photo {index} ({file_name}) has unsupported type {mime_type}")]
    UnsupportedType {
        index: usize,
        file_name: String,
        mime_type: String,
    },

    /// File exceeds the per-file size limit
    #[error("Photo {index} ({file_name}) is too large: {size_bytes} bytes > {max_mb}MB")]
    FileTooLarge {
        index: usize,
        file_name: String,
        size_bytes: u64,
        max_mb: u64,
    },

    /// File has no content
    #[error("Photo {index} ({file_name}) is empty")]
    EmptyFile { index: usize, file_name: String },

    /// Alt text longer than the stored column allows
    #[error("Alt text is too long: {len} > {max} characters")]
    AltTextTooLong { len: usize, max: usize },
}

impl ValidationError {
    /// Name of the form field the error refers to (`photos` or `photos.N`).
    pub fn field(&self) -> String {
        match self {
            Self::EmptyBatch | Self::TooManyFiles { .. } => "photos".to_string(),
            Self::UnsupportedType { index, .. }
            | Self::FileTooLarge { index, .. }
            | Self::EmptyFile { index, .. } => format!("photos.{index}"),
            Self::AltTextTooLong { .. } => "alt_text".to_string(),
        }
    }
}

/// Per-file pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image decoding failed
    #[error("Decode error for {file_name}: {message}")]
    Decode { file_name: String, message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {file_name} after {timeout_ms}ms")]
    Timeout {
        file_name: String,
        stage: String,
        timeout_ms: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {file_name} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        file_name: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Variant encoding failed
    #[error("Encode error for {variant} variant: {message}")]
    Encode { variant: String, message: String },
}

/// Object storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem or backend I/O failure
    #[error("Storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Logical path is empty, absolute, or escapes the storage root
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    /// Backend refused the write
    #[error("Write rejected for {path}: {message}")]
    Rejected { path: String, message: String },
}

/// Gallery registry errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Acting user does not own the product's atelier
    #[error("User {user} may not modify product {product}")]
    Forbidden { product: ProductId, user: UserId },

    /// Acting user does not own the atelier
    #[error("User {user} may not modify atelier {atelier}")]
    AtelierForbidden { atelier: AtelierId, user: UserId },

    /// Photo id unknown or owned by another product
    #[error("Photo {photo} not found for product {product}")]
    NotFound { product: ProductId, photo: PhotoId },

    /// Product id unknown to the catalog
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    /// Atelier id unknown to the catalog
    #[error("Atelier {0} not found")]
    AtelierNotFound(AtelierId),
}

/// Convenience type alias for Atelier results.
pub type Result<T> = std::result::Result<T, AtelierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_field_names() {
        assert_eq!(ValidationError::EmptyBatch.field(), "photos");
        assert_eq!(
            ValidationError::TooManyFiles { count: 11, max: 10 }.field(),
            "photos"
        );
        let err = ValidationError::FileTooLarge {
            index: 3,
            file_name: "big.jpg".into(),
            size_bytes: 6 * 1024 * 1024,
            max_mb: 5,
        };
        assert_eq!(err.field(), "photos.3");
    }

    #[test]
    fn test_registry_error_messages() {
        let err = RegistryError::NotFound {
            product: ProductId(4),
            photo: PhotoId(9),
        };
        assert_eq!(err.to_string(), "Photo 9 not found for product 4");

        let err: AtelierError = RegistryError::Forbidden {
            product: ProductId(1),
            user: UserId(2),
        }
        .into();
        assert!(err.to_string().contains("may not modify product 1"));
    }
}
