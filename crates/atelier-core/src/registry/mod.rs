//! Photo registry: per-product galleries behind per-product locks.
//!
//! Every mutating operation takes the acting user and checks that the user
//! owns the product's atelier before touching anything. Mutations of one
//! product are serialized by that product's lock; different products never
//! contend.

pub mod gallery;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::{Mutex, RwLock};

use crate::error::RegistryError;
use crate::storage::{ObjectStorage, VariantWriter};
use crate::types::{
    AtelierId, DisplayUrls, PhotoId, ProductId, ProductPhoto, ProductRef, ReorderEntry, UserId,
};

pub use gallery::{Gallery, PhotoDraft};

/// Answers which atelier a product belongs to and who owns an atelier.
pub trait Ownership: Send + Sync {
    /// Atelier the product belongs to, or `None` for an unknown product.
    fn product_atelier(&self, product: ProductId) -> Option<AtelierId>;

    /// Owner of the atelier, or `None` for an unknown atelier.
    fn atelier_owner(&self, atelier: AtelierId) -> Option<UserId>;

    /// Owner of the product's atelier, or `None` for an unknown product.
    fn product_owner(&self, product: ProductId) -> Option<UserId> {
        self.product_atelier(product)
            .and_then(|atelier| self.atelier_owner(atelier))
    }
}

/// Check that `user` may modify `product`.
pub fn authorize_product(
    ownership: &dyn Ownership,
    product: ProductId,
    user: UserId,
) -> Result<(), RegistryError> {
    match ownership.product_owner(product) {
        None => Err(RegistryError::ProductNotFound(product)),
        Some(owner) if owner == user => Ok(()),
        Some(_) => Err(RegistryError::Forbidden { product, user }),
    }
}

/// Check that `user` may upload to `product` and return the atelier its files belong under.
///
/// The atelier comes from `ownership`; a reference naming any other atelier is refused.
pub fn authorize_upload(
    ownership: &dyn Ownership,
    product: &ProductRef,
    user: UserId,
) -> Result<AtelierId, RegistryError> {
    authorize_product(ownership, product.id, user)?;
    match ownership.product_atelier(product.id) {
        Some(atelier) if atelier == product.atelier_id => Ok(atelier),
        Some(_) => Err(RegistryError::Forbidden {
            product: product.id,
            user,
        }),
        None => Err(RegistryError::ProductNotFound(product.id)),
    }
}

/// Check that `user` may modify `atelier`.
pub fn authorize_atelier(
    ownership: &dyn Ownership,
    atelier: AtelierId,
    user: UserId,
) -> Result<(), RegistryError> {
    match ownership.atelier_owner(atelier) {
        None => Err(RegistryError::AtelierNotFound(atelier)),
        Some(owner) if owner == user => Ok(()),
        Some(_) => Err(RegistryError::AtelierForbidden { atelier, user }),
    }
}

/// All registry rows, for persistence between processes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub photos: Vec<ProductPhoto>,
}

pub struct PhotoRegistry {
    galleries: RwLock<HashMap<ProductId, Arc<Mutex<Gallery>>>>,
    next_id: AtomicU64,
    ownership: Arc<dyn Ownership>,
    writer: VariantWriter,
}

impl PhotoRegistry {
    pub fn new(ownership: Arc<dyn Ownership>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            galleries: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            ownership,
            writer: VariantWriter::new(storage),
        }
    }

    /// Rebuild a registry from a snapshot. New ids continue past the largest stored id.
    pub fn from_snapshot(
        snapshot: RegistrySnapshot,
        ownership: Arc<dyn Ownership>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let next_id = snapshot
            .photos
            .iter()
            .map(|p| p.id.0)
            .max()
            .map_or(1, |max| max + 1);

        let mut rows: HashMap<ProductId, Vec<ProductPhoto>> = HashMap::new();
        for photo in snapshot.photos {
            rows.entry(photo.product_id).or_default().push(photo);
        }
        let galleries = rows
            .into_iter()
            .map(|(product, rows)| {
                (
                    product,
                    Arc::new(Mutex::new(Gallery::from_rows(product, rows))),
                )
            })
            .collect();

        tracing::debug!("Registry restored, next photo id {}", next_id);
        Self {
            galleries: RwLock::new(galleries),
            next_id: AtomicU64::new(next_id),
            ownership,
            writer: VariantWriter::new(storage),
        }
    }

    /// Export every row, ordered by id.
    pub async fn snapshot(&self) -> RegistrySnapshot {
        let galleries: Vec<Arc<Mutex<Gallery>>> =
            self.galleries.read().await.values().cloned().collect();
        let mut photos = Vec::new();
        for gallery in galleries {
            photos.extend(gallery.lock().await.rows().iter().cloned());
        }
        photos.sort_by_key(|p| p.id);
        RegistrySnapshot { photos }
    }

    pub fn ownership(&self) -> &Arc<dyn Ownership> {
        &self.ownership
    }

    pub fn storage(&self) -> &Arc<dyn ObjectStorage> {
        self.writer.storage()
    }

    /// Check that `user` may modify `product`.
    pub fn authorize(&self, product: ProductId, user: UserId) -> Result<(), RegistryError> {
        authorize_product(self.ownership.as_ref(), product, user)
    }

    async fn gallery(&self, product: ProductId) -> Arc<Mutex<Gallery>> {
        if let Some(gallery) = self.galleries.read().await.get(&product) {
            return gallery.clone();
        }
        self.galleries
            .write()
            .await
            .entry(product)
            .or_insert_with(|| Arc::new(Mutex::new(Gallery::new(product))))
            .clone()
    }

    async fn existing_gallery(&self, product: ProductId) -> Option<Arc<Mutex<Gallery>>> {
        self.galleries.read().await.get(&product).cloned()
    }

    /// Append a photo to `product`.
    ///
    /// `batch_index` is the ordinal of the photo among those appended by the
    /// current upload batch; it decides whether the photo becomes the cover.
    pub async fn append(
        &self,
        product: ProductId,
        user: UserId,
        draft: PhotoDraft,
        batch_index: usize,
    ) -> Result<ProductPhoto, RegistryError> {
        self.authorize(product, user)?;
        let id = PhotoId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let gallery = self.gallery(product).await;
        let photo = gallery
            .lock()
            .await
            .append(id, draft, batch_index, SystemTime::now());
        tracing::debug!(
            "Appended photo {} to product {} at position {}{}",
            photo.id,
            product,
            photo.position,
            if photo.is_cover { " (cover)" } else { "" }
        );
        Ok(photo)
    }

    /// Delete a photo and its three files.
    ///
    /// The row is tombstoned and the cover promoted under the product lock;
    /// files are removed afterwards, and a failed file delete is only logged.
    pub async fn delete(
        &self,
        product: ProductId,
        user: UserId,
        photo: PhotoId,
    ) -> Result<ProductPhoto, RegistryError> {
        self.authorize(product, user)?;
        let gallery = self
            .existing_gallery(product)
            .await
            .ok_or(RegistryError::NotFound { product, photo })?;

        let removed = gallery.lock().await.remove(photo, SystemTime::now())?;
        self.writer.remove(&removed.paths).await;
        tracing::info!("Deleted photo {} of product {}", photo, product);
        Ok(removed)
    }

    /// Make `photo` the product's only cover.
    pub async fn set_cover(
        &self,
        product: ProductId,
        user: UserId,
        photo: PhotoId,
    ) -> Result<ProductPhoto, RegistryError> {
        self.authorize(product, user)?;
        let gallery = self
            .existing_gallery(product)
            .await
            .ok_or(RegistryError::NotFound { product, photo })?;
        let updated = gallery.lock().await.set_cover(photo)?;
        tracing::debug!("Photo {} is now the cover of product {}", photo, product);
        Ok(updated)
    }

    /// Apply `(id, position)` pairs. Entries for photos outside the product
    /// are ignored. Returns the number of photos updated.
    pub async fn reorder(
        &self,
        product: ProductId,
        user: UserId,
        entries: &[ReorderEntry],
    ) -> Result<usize, RegistryError> {
        self.authorize(product, user)?;
        let Some(gallery) = self.existing_gallery(product).await else {
            return Ok(0);
        };
        let updated = gallery.lock().await.reorder(entries);
        if updated < entries.len() {
            tracing::debug!(
                "Reorder of product {} ignored {} foreign or unknown id(s)",
                product,
                entries.len() - updated
            );
        }
        Ok(updated)
    }

    /// Bring back a deleted photo at the end of the gallery.
    pub async fn restore(
        &self,
        product: ProductId,
        user: UserId,
        photo: PhotoId,
    ) -> Result<ProductPhoto, RegistryError> {
        self.authorize(product, user)?;
        let gallery = self
            .existing_gallery(product)
            .await
            .ok_or(RegistryError::NotFound { product, photo })?;
        let restored = gallery.lock().await.restore(photo)?;
        tracing::info!("Restored photo {} of product {}", photo, product);
        Ok(restored)
    }

    /// Live photos in display order.
    pub async fn list(&self, product: ProductId) -> Vec<ProductPhoto> {
        let Some(gallery) = self.existing_gallery(product).await else {
            return Vec::new();
        };
        let guard = gallery.lock().await;
        guard.ordered().into_iter().cloned().collect()
    }

    pub async fn cover(&self, product: ProductId) -> Option<ProductPhoto> {
        let gallery = self.existing_gallery(product).await?;
        let guard = gallery.lock().await;
        guard.cover().cloned()
    }

    /// Deleted photos of `product`, most recent first.
    pub async fn trashed(
        &self,
        product: ProductId,
        user: UserId,
    ) -> Result<Vec<ProductPhoto>, RegistryError> {
        self.authorize(product, user)?;
        let Some(gallery) = self.existing_gallery(product).await else {
            return Ok(Vec::new());
        };
        let guard = gallery.lock().await;
        Ok(guard.trashed().into_iter().cloned().collect())
    }

    /// URLs to display `photo`. An external URL wins over stored files.
    pub fn display_urls(&self, photo: &ProductPhoto) -> DisplayUrls {
        match &photo.external_url {
            Some(url) => DisplayUrls {
                original: url.clone(),
                medium: url.clone(),
                thumb: url.clone(),
            },
            None => {
                let storage = self.writer.storage();
                DisplayUrls {
                    original: storage.url(&photo.paths.original),
                    medium: storage.url(&photo.paths.medium),
                    thumb: storage.url(&photo.paths.thumb),
                }
            }
        }
    }
}
