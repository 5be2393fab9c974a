//! Atelier Core - product photo intake and gallery management.
//!
//! Takes uploaded product photos, derives three JPEG variants of each,
//! stores them through an object-storage backend, and keeps every product's
//! gallery ordered with exactly one cover photo.
//!
//! # Architecture
//!
//! ```text
//! Upload batch → Validate → Decode → Resize (x3) → Encode (x3) → Store (x3) → Registry
//! ```
//!
//! Validation and authorization failures reject a batch before any side
//! effect. Decode and storage failures skip the affected file only.
//!
//! # Usage
//!
//! ```rust,ignore
//! use atelier_core::{Atelier, Catalog, Config, ProductId, UserId};
//!
//! #[tokio::main]
//! async fn main() -> atelier_core::Result<()> {
//!     let config = Config::load()?;
//!     let atelier = Atelier::local(config, Catalog::new(), Default::default());
//!
//!     let product = atelier.product(ProductId(1))?;
//!     let report = atelier.upload_photos(&product, files, UserId(7)).await?;
//!     println!("{}", report.message());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod catalog;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod registry;
pub mod storage;
pub mod types;

// Re-exports for convenient access
pub use catalog::Catalog;
pub use config::Config;
pub use error::{
    AtelierError, ConfigError, PipelineError, RegistryError, Result, StorageError,
    ValidationError,
};
pub use output::{OutputFormat, OutputWriter, PhotoView};
pub use pipeline::{LpImageUploader, UploadOptions, UploadProcessor};
pub use registry::{Ownership, PhotoRegistry, RegistrySnapshot};
pub use storage::{LocalDiskStorage, MemoryStorage, ObjectStorage};
pub use types::{
    AtelierId, AtelierRef, DisplayUrls, LpImage, LpImageKind, PhotoId, ProductId, ProductPhoto,
    ProductRef, ReorderEntry, UploadFile, UploadReport, UserId,
};

use std::sync::Arc;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The photo engine - the main entry point for embedding applications.
pub struct Atelier {
    config: Config,
    catalog: Arc<Catalog>,
    registry: Arc<PhotoRegistry>,
    processor: UploadProcessor,
    lp: LpImageUploader,
}

impl Atelier {
    /// Create an engine over the given catalog, storage and registry rows.
    pub fn new(
        config: Config,
        catalog: Catalog,
        storage: Arc<dyn ObjectStorage>,
        snapshot: RegistrySnapshot,
    ) -> Self {
        tracing::debug!(
            "Initializing Atelier v{} on {} storage ({} stored photo rows)",
            VERSION,
            storage.backend_tag(),
            snapshot.photos.len()
        );
        let catalog = Arc::new(catalog);
        let ownership: Arc<dyn Ownership> = catalog.clone();
        let registry = Arc::new(PhotoRegistry::from_snapshot(
            snapshot,
            ownership.clone(),
            storage.clone(),
        ));
        let processor = UploadProcessor::new(&config, registry.clone());
        let lp = LpImageUploader::new(config.limits.clone(), ownership, storage);
        Self {
            config,
            catalog,
            registry,
            processor,
            lp,
        }
    }

    /// Create an engine storing files on local disk under the configured root.
    pub fn local(config: Config, catalog: Catalog, snapshot: RegistrySnapshot) -> Self {
        let storage = Arc::new(LocalDiskStorage::new(
            config.storage_root(),
            config.storage.public_url.clone(),
        ));
        Self::new(config, catalog, storage, snapshot)
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &Arc<PhotoRegistry> {
        &self.registry
    }

    /// Resolve a product id through the catalog.
    pub fn product(&self, id: ProductId) -> Result<ProductRef> {
        Ok(self.catalog.product(id)?)
    }

    /// Resolve an atelier id through the catalog.
    pub fn atelier(&self, id: AtelierId) -> Result<AtelierRef> {
        Ok(self.catalog.atelier(id)?)
    }

    /// Upload a batch of product photos.
    pub async fn upload_photos(
        &self,
        product: &ProductRef,
        files: Vec<UploadFile>,
        user: UserId,
    ) -> Result<UploadReport> {
        self.processor.upload_batch(product, files, user).await
    }

    /// Upload a batch of product photos with custom options.
    pub async fn upload_photos_with_options(
        &self,
        product: &ProductRef,
        files: Vec<UploadFile>,
        user: UserId,
        options: &UploadOptions,
    ) -> Result<UploadReport> {
        self.processor
            .upload_batch_with_options(product, files, user, options)
            .await
    }

    /// Store a landing-page hero or logo image.
    pub async fn upload_lp_image(
        &self,
        atelier: &AtelierRef,
        user: UserId,
        kind: LpImageKind,
        file: UploadFile,
    ) -> Result<LpImage> {
        self.lp.upload(atelier, user, kind, file).await
    }

    pub async fn delete_photo(
        &self,
        product: ProductId,
        user: UserId,
        photo: PhotoId,
    ) -> Result<ProductPhoto> {
        Ok(self.registry.delete(product, user, photo).await?)
    }

    pub async fn set_cover(
        &self,
        product: ProductId,
        user: UserId,
        photo: PhotoId,
    ) -> Result<ProductPhoto> {
        Ok(self.registry.set_cover(product, user, photo).await?)
    }

    pub async fn reorder(
        &self,
        product: ProductId,
        user: UserId,
        entries: &[ReorderEntry],
    ) -> Result<usize> {
        Ok(self.registry.reorder(product, user, entries).await?)
    }

    pub async fn restore_photo(
        &self,
        product: ProductId,
        user: UserId,
        photo: PhotoId,
    ) -> Result<ProductPhoto> {
        Ok(self.registry.restore(product, user, photo).await?)
    }

    /// Live photos of a product with their display URLs, in display order.
    pub async fn list(&self, product: ProductId) -> Vec<PhotoView> {
        self.registry
            .list(product)
            .await
            .iter()
            .map(|photo| PhotoView::new(photo, self.registry.display_urls(photo)))
            .collect()
    }

    pub async fn cover(&self, product: ProductId) -> Option<PhotoView> {
        let photo = self.registry.cover(product).await?;
        Some(PhotoView::new(&photo, self.registry.display_urls(&photo)))
    }

    pub async fn trashed(&self, product: ProductId, user: UserId) -> Result<Vec<ProductPhoto>> {
        Ok(self.registry.trashed(product, user).await?)
    }

    /// Export registry rows for persistence.
    pub async fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_atelier_resolves_catalog() {
        let mut catalog = Catalog::new();
        catalog.add_atelier(AtelierId(1), UserId(2));
        catalog.add_product(ProductId(3), AtelierId(1)).unwrap();

        let atelier = Atelier::new(
            Config::default(),
            catalog,
            Arc::new(MemoryStorage::default()),
            RegistrySnapshot::default(),
        );
        assert_eq!(atelier.product(ProductId(3)).unwrap().atelier_id, AtelierId(1));
        assert!(matches!(
            atelier.product(ProductId(4)),
            Err(AtelierError::Registry(RegistryError::ProductNotFound(_)))
        ));
        assert!(atelier.list(ProductId(3)).await.is_empty());
        assert!(atelier.cover(ProductId(3)).await.is_none());
    }
}
