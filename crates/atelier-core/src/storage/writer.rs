//! Writes the three variants of one photo as a unit.

use std::sync::Arc;
use uuid::Uuid;

use super::layout::variant_paths;
use super::ObjectStorage;
use crate::error::StorageError;
use crate::pipeline::variants::{RenderedVariant, VariantKind};
use crate::types::{AtelierId, VariantPaths};

/// Persists rendered variants under the product photo layout.
///
/// Either all three variants are written, or none are left behind: a
/// failed write deletes whatever this call already wrote.
#[derive(Clone)]
pub struct VariantWriter {
    storage: Arc<dyn ObjectStorage>,
}

impl VariantWriter {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn ObjectStorage> {
        &self.storage
    }

    /// Write `variants` under a fresh stem for `atelier`.
    pub async fn write(
        &self,
        atelier: AtelierId,
        variants: &[RenderedVariant],
    ) -> Result<VariantPaths, StorageError> {
        self.write_with_stem(atelier, &Uuid::new_v4(), variants).await
    }

    /// Write `variants` under `stem`. Exactly one variant of each kind is expected.
    pub async fn write_with_stem(
        &self,
        atelier: AtelierId,
        stem: &Uuid,
        variants: &[RenderedVariant],
    ) -> Result<VariantPaths, StorageError> {
        let paths = variant_paths(atelier, stem);

        for kind in VariantKind::ALL {
            if !variants.iter().any(|v| v.kind == kind) {
                return Err(StorageError::Rejected {
                    path: path_for(&paths, kind).to_string(),
                    message: format!("missing {kind} variant"),
                });
            }
        }

        let mut written: Vec<&str> = Vec::with_capacity(variants.len());
        for variant in variants {
            let path = path_for(&paths, variant.kind);
            match self.storage.write(path, &variant.bytes).await {
                Ok(_) => written.push(path),
                Err(e) => {
                    tracing::warn!(
                        "Write of {} failed on {} backend, rolling back {} file(s): {}",
                        path,
                        self.storage.backend_tag(),
                        written.len(),
                        e
                    );
                    for done in written {
                        self.delete_quietly(done).await;
                    }
                    return Err(e);
                }
            }
        }

        tracing::debug!(
            "Stored variants {} / {} / {}",
            paths.original,
            paths.medium,
            paths.thumb
        );
        Ok(paths)
    }

    /// Delete all three files of a photo, logging failures instead of returning them.
    pub async fn remove(&self, paths: &VariantPaths) {
        for path in paths.all() {
            self.delete_quietly(path).await;
        }
    }

    async fn delete_quietly(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            tracing::warn!("Failed to delete {}: {}", path, e);
        }
    }
}

fn path_for(paths: &VariantPaths, kind: VariantKind) -> &str {
    match kind {
        VariantKind::Original => &paths.original,
        VariantKind::Medium => &paths.medium,
        VariantKind::Thumb => &paths.thumb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn rendered() -> Vec<RenderedVariant> {
        VariantKind::ALL
            .iter()
            .map(|&kind| RenderedVariant {
                kind,
                width: 1,
                height: 1,
                bytes: vec![0xFF, 0xD8],
            })
            .collect()
    }

    #[tokio::test]
    async fn test_writes_all_three() {
        let storage = Arc::new(MemoryStorage::default());
        let writer = VariantWriter::new(storage.clone());

        let paths = writer.write(AtelierId(5), &rendered()).await.unwrap();
        assert!(paths.original.starts_with("product_photos/5/original/"));
        assert!(paths.thumb.starts_with("product_photos/5/thumbs/"));
        for path in paths.all() {
            assert!(storage.contains(path).await);
        }
    }

    #[tokio::test]
    async fn test_rolls_back_on_failure() {
        let storage = Arc::new(MemoryStorage::default());
        storage.fail_writes_containing("/thumbs/").await;
        let writer = VariantWriter::new(storage.clone());

        let err = writer.write(AtelierId(5), &rendered()).await.unwrap_err();
        assert!(matches!(err, StorageError::Rejected { .. }));
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_rejects_incomplete_set() {
        let storage = Arc::new(MemoryStorage::default());
        let writer = VariantWriter::new(storage.clone());
        let mut variants = rendered();
        variants.pop();

        assert!(writer.write(AtelierId(5), &variants).await.is_err());
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_tolerates_missing_files() {
        let storage = Arc::new(MemoryStorage::default());
        let writer = VariantWriter::new(storage.clone());
        let paths = writer.write(AtelierId(1), &rendered()).await.unwrap();

        writer.remove(&paths).await;
        writer.remove(&paths).await;
        assert!(storage.is_empty().await);
    }
}
