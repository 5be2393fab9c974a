//! In-memory backend with injectable write and delete failures.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::{check_logical_path, join_url, ObjectStorage, StorageRef};
use crate::error::StorageError;

/// In-process object storage.
///
/// Writes to any path containing the configured failure pattern are
/// rejected, which lets tests exercise partial-write rollback.
pub struct MemoryStorage {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    fail_pattern: Mutex<Option<String>>,
    fail_deletes: AtomicBool,
    public_url: String,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("/storage")
    }
}

impl MemoryStorage {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            fail_pattern: Mutex::new(None),
            fail_deletes: AtomicBool::new(false),
            public_url: public_url.into(),
        }
    }

    /// Reject every later write whose path contains `pattern`.
    pub async fn fail_writes_containing(&self, pattern: impl Into<String>) {
        *self.fail_pattern.lock().await = Some(pattern.into());
    }

    /// Stop rejecting writes.
    pub async fn clear_failures(&self) {
        *self.fail_pattern.lock().await = None;
        self.fail_deletes.store(false, Ordering::Relaxed);
    }

    /// Make every later delete fail.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::Relaxed);
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.objects.lock().await.contains_key(path)
    }

    pub async fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().await.get(path).cloned()
    }

    /// Stored paths in lexical order.
    pub async fn paths(&self) -> Vec<String> {
        self.objects.lock().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn write(&self, path: &str, bytes: &[u8]) -> Result<StorageRef, StorageError> {
        check_logical_path(path)?;
        if let Some(pattern) = self.fail_pattern.lock().await.as_deref() {
            if path.contains(pattern) {
                return Err(StorageError::Rejected {
                    path: path.to_string(),
                    message: "injected write failure".to_string(),
                });
            }
        }
        self.objects
            .lock()
            .await
            .insert(path.to_string(), bytes.to_vec());
        Ok(StorageRef {
            path: path.to_string(),
            url: self.url(path),
        })
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        check_logical_path(path)?;
        if self.fail_deletes.load(Ordering::Relaxed) {
            return Err(StorageError::Rejected {
                path: path.to_string(),
                message: "injected delete failure".to_string(),
            });
        }
        self.objects.lock().await.remove(path);
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.public_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_and_delete() {
        let storage = MemoryStorage::default();
        let stored = storage.write("a/b.jpg", b"x").await.unwrap();
        assert_eq!(stored.url, "/storage/a/b.jpg");
        assert_eq!(storage.get("a/b.jpg").await.unwrap(), b"x");

        storage.delete("a/b.jpg").await.unwrap();
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let storage = MemoryStorage::default();
        storage.fail_writes_containing("/thumbs/").await;

        assert!(storage.write("p/1/medium/a.jpg", b"x").await.is_ok());
        let err = storage.write("p/1/thumbs/a.jpg", b"x").await.unwrap_err();
        assert!(matches!(err, StorageError::Rejected { .. }));
        assert_eq!(storage.paths().await, vec!["p/1/medium/a.jpg".to_string()]);

        storage.clear_failures().await;
        assert!(storage.write("p/1/thumbs/a.jpg", b"x").await.is_ok());
    }
}
