//! Object storage for encoded variants and landing-page images.
//!
//! - **layout**: deterministic logical paths (persisted, must stay stable)
//! - **local**: local disk backend rooted at a directory
//! - **memory**: in-process backend with failure injection
//! - **writer**: the three-variants-as-one-unit write with rollback

pub mod layout;
pub mod local;
pub mod memory;
pub mod writer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

pub use layout::{lp_image_path, variant_path, variant_paths};
pub use local::LocalDiskStorage;
pub use memory::MemoryStorage;
pub use writer::VariantWriter;

/// A successfully written object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRef {
    /// Logical, storage-relative path
    pub path: String,
    /// Public URL of the object
    pub url: String,
}

/// Generic object storage.
///
/// Logical paths are `/`-separated and relative; backends reject anything
/// that could escape their root.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Short backend name for logs.
    fn backend_tag(&self) -> &'static str;

    /// Write `bytes` at `path`, creating intermediate directories as needed.
    async fn write(&self, path: &str, bytes: &[u8]) -> Result<StorageRef, StorageError>;

    /// Delete the object at `path`. Deleting a missing object succeeds.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Public URL for `path`.
    fn url(&self, path: &str) -> String;
}

/// Reject empty, absolute, or parent-relative logical paths.
pub(crate) fn check_logical_path(path: &str) -> Result<(), StorageError> {
    if path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Join a URL prefix and a logical path with exactly one slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_path_checks() {
        assert!(check_logical_path("product_photos/1/thumbs/a.jpg").is_ok());
        assert!(check_logical_path("").is_err());
        assert!(check_logical_path("/etc/passwd").is_err());
        assert!(check_logical_path("product_photos/../secrets").is_err());
        assert!(check_logical_path("a//b").is_err());
        assert!(check_logical_path("a\\b").is_err());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("/storage", "a/b.jpg"), "/storage/a/b.jpg");
        assert_eq!(
            join_url("https://cdn.example.com/", "a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
    }
}
