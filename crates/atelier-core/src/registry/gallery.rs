//! One product's photo gallery and its ordering and cover rules.
//!
//! A gallery is plain data; [`PhotoRegistry`](super::PhotoRegistry) wraps
//! each one in a lock so every mutation here runs as a single critical
//! section. Rules maintained by every mutation:
//!
//! - a gallery with live photos has exactly one live cover
//! - an empty gallery has no cover
//! - tombstoned photos are never the cover and are ignored by ordering

use std::time::SystemTime;

use crate::error::RegistryError;
use crate::types::{PhotoId, ProductId, ProductPhoto, ReorderEntry, VariantPaths};

/// Data for a photo about to be appended.
#[derive(Debug, Clone)]
pub struct PhotoDraft {
    pub paths: VariantPaths,
    pub external_url: Option<String>,
    pub alt_text: Option<String>,
}

impl PhotoDraft {
    pub fn new(paths: VariantPaths) -> Self {
        Self {
            paths,
            external_url: None,
            alt_text: None,
        }
    }

    pub fn with_alt_text(mut self, alt_text: Option<String>) -> Self {
        self.alt_text = alt_text;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Gallery {
    product_id: ProductId,
    photos: Vec<ProductPhoto>,
}

impl Gallery {
    pub fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            photos: Vec::new(),
        }
    }

    /// Rebuild from stored rows. Rows of other products are dropped.
    pub fn from_rows(product_id: ProductId, rows: Vec<ProductPhoto>) -> Self {
        let photos = rows
            .into_iter()
            .filter(|p| p.product_id == product_id)
            .collect();
        Self {
            product_id,
            photos,
        }
    }

    pub fn live_count(&self) -> usize {
        self.photos.iter().filter(|p| p.is_live()).count()
    }

    /// Position for the next appended or restored photo.
    pub fn next_position(&self) -> i64 {
        self.photos
            .iter()
            .filter(|p| p.is_live())
            .map(|p| p.position)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Live photos in display order: position ascending, ties by id.
    pub fn ordered(&self) -> Vec<&ProductPhoto> {
        let mut live: Vec<&ProductPhoto> = self.photos.iter().filter(|p| p.is_live()).collect();
        live.sort_by_key(|p| (p.position, p.id));
        live
    }

    pub fn cover(&self) -> Option<&ProductPhoto> {
        self.photos.iter().find(|p| p.is_live() && p.is_cover)
    }

    /// Tombstoned photos, most recently deleted first.
    pub fn trashed(&self) -> Vec<&ProductPhoto> {
        let mut trashed: Vec<&ProductPhoto> =
            self.photos.iter().filter(|p| !p.is_live()).collect();
        trashed.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at).then(a.id.cmp(&b.id)));
        trashed
    }

    /// Every row, live and tombstoned.
    pub fn rows(&self) -> &[ProductPhoto] {
        &self.photos
    }

    /// Append a photo at the end of the gallery.
    ///
    /// `batch_index` is the ordinal of this photo among those appended by
    /// the current upload batch. The first photo of a batch into an empty
    /// gallery becomes the cover; a gallery left without a cover also
    /// takes the new photo as cover.
    pub fn append(
        &mut self,
        id: PhotoId,
        draft: PhotoDraft,
        batch_index: usize,
        now: SystemTime,
    ) -> ProductPhoto {
        let was_empty = self.live_count() == 0;
        let is_cover = (was_empty && batch_index == 0) || self.cover().is_none();

        let photo = ProductPhoto {
            id,
            product_id: self.product_id,
            paths: draft.paths,
            external_url: draft.external_url,
            alt_text: draft.alt_text,
            is_cover,
            position: self.next_position(),
            created_at: now,
            deleted_at: None,
        };
        self.photos.push(photo.clone());
        photo
    }

    /// Tombstone a live photo, promoting a new cover when needed.
    ///
    /// Returns the removed row.
    pub fn remove(&mut self, id: PhotoId, now: SystemTime) -> Result<ProductPhoto, RegistryError> {
        let index = self.live_index(id)?;
        let photo = &mut self.photos[index];
        let was_cover = photo.is_cover;
        photo.is_cover = false;
        photo.deleted_at = Some(now);
        let removed = photo.clone();

        if was_cover {
            self.promote_cover();
        }
        Ok(removed)
    }

    /// Make `id` the only cover.
    pub fn set_cover(&mut self, id: PhotoId) -> Result<ProductPhoto, RegistryError> {
        let index = self.live_index(id)?;
        for photo in &mut self.photos {
            photo.is_cover = false;
        }
        self.photos[index].is_cover = true;
        Ok(self.photos[index].clone())
    }

    /// Apply `(id, position)` pairs to live photos of this gallery.
    ///
    /// Unknown ids, including photos of other products, are skipped.
    /// Returns the number of photos updated.
    pub fn reorder(&mut self, entries: &[ReorderEntry]) -> usize {
        let mut updated = 0;
        for entry in entries {
            if let Some(photo) = self
                .photos
                .iter_mut()
                .find(|p| p.id == entry.id && p.is_live())
            {
                photo.position = entry.position;
                updated += 1;
            }
        }
        updated
    }

    /// Clear the tombstone of `id` and move it to the end.
    pub fn restore(&mut self, id: PhotoId) -> Result<ProductPhoto, RegistryError> {
        let index = self
            .photos
            .iter()
            .position(|p| p.id == id && !p.is_live())
            .ok_or(RegistryError::NotFound {
                product: self.product_id,
                photo: id,
            })?;

        let position = self.next_position();
        let needs_cover = self.cover().is_none();
        let photo = &mut self.photos[index];
        photo.deleted_at = None;
        photo.position = position;
        photo.is_cover = needs_cover;
        Ok(photo.clone())
    }

    fn live_index(&self, id: PhotoId) -> Result<usize, RegistryError> {
        self.photos
            .iter()
            .position(|p| p.id == id && p.is_live())
            .ok_or(RegistryError::NotFound {
                product: self.product_id,
                photo: id,
            })
    }

    fn promote_cover(&mut self) {
        let next = self
            .photos
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_live())
            .min_by_key(|(_, p)| (p.position, p.id))
            .map(|(index, _)| index);
        if let Some(index) = next {
            self.photos[index].is_cover = true;
        }
    }
}
