//! Local disk backend: logical paths map onto files under a root directory.

use async_trait::async_trait;
use std::path::PathBuf;

use super::{check_logical_path, join_url, ObjectStorage, StorageRef};
use crate::error::StorageError;

pub struct LocalDiskStorage {
    root: PathBuf,
    public_url: String,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into(),
        }
    }

    /// Absolute filesystem path for a logical path.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        check_logical_path(path)?;
        Ok(path
            .split('/')
            .fold(self.root.clone(), |acc, segment| acc.join(segment)))
    }
}

#[async_trait]
impl ObjectStorage for LocalDiskStorage {
    fn backend_tag(&self) -> &'static str {
        "local"
    }

    async fn write(&self, path: &str, bytes: &[u8]) -> Result<StorageRef, StorageError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|source| StorageError::Io {
                path: target.clone(),
                source,
            })?;
        tracing::trace!("Wrote {} bytes to {:?}", bytes.len(), target);
        Ok(StorageRef {
            path: path.to_string(),
            url: self.url(path),
        })
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                path: target,
                source,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.public_url, path)
    }
}
