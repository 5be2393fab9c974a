//! Upload orchestration - wires together all processing stages.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::{AtelierError, PipelineError, Result};
use crate::registry::{authorize_upload, PhotoDraft, PhotoRegistry};
use crate::storage::VariantWriter;
use crate::types::{
    AtelierId, ProductRef, SkippedFile, UploadFile, UploadReport, UserId, VariantPaths,
};

use super::decode::{format_to_string, ImageDecoder};
use super::validate::Validator;
use super::variants::VariantRenderer;

/// Options applied to every photo of a batch.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Alt text stored on each created photo
    pub alt_text: Option<String>,
}

/// Turns an upload batch into registered product photos.
pub struct UploadProcessor {
    validator: Validator,
    decoder: ImageDecoder,
    renderer: VariantRenderer,
    writer: VariantWriter,
    registry: Arc<PhotoRegistry>,
}

impl UploadProcessor {
    /// Create a processor storing through the registry's storage backend.
    pub fn new(config: &Config, registry: Arc<PhotoRegistry>) -> Self {
        Self {
            validator: Validator::new(config.limits.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            renderer: VariantRenderer::new(config.variants.clone()),
            writer: VariantWriter::new(registry.storage().clone()),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<PhotoRegistry> {
        &self.registry
    }

    /// Upload a batch of photos to `product` on behalf of `user`.
    pub async fn upload_batch(
        &self,
        product: &ProductRef,
        files: Vec<UploadFile>,
        user: UserId,
    ) -> Result<UploadReport> {
        self.upload_batch_with_options(product, files, user, &UploadOptions::default())
            .await
    }

    /// Upload a batch with custom options.
    ///
    /// Authorization and intake validation run before any work and reject
    /// the whole batch. After that, files are processed in submission order
    /// and a file that fails to decode, render or store is skipped without
    /// affecting the others.
    pub async fn upload_batch_with_options(
        &self,
        product: &ProductRef,
        files: Vec<UploadFile>,
        user: UserId,
        options: &UploadOptions,
    ) -> Result<UploadReport> {
        let start = Instant::now();

        let atelier = authorize_upload(self.registry.ownership().as_ref(), product, user)?;
        self.validator.validate_batch(&files)?;
        Validator::validate_alt_text(options.alt_text.as_deref())?;

        tracing::info!(
            "Uploading {} file(s) to product {} (atelier {})",
            files.len(),
            product.id,
            atelier
        );

        let mut report = UploadReport::default();
        for (index, file) in files.into_iter().enumerate() {
            let file_name = file.file_name.clone();

            let paths = match self.process_file(atelier, file).await {
                Ok(paths) => paths,
                Err(e) => {
                    tracing::warn!("Skipping {} (#{}): {}", file_name, index, e);
                    report.skipped.push(SkippedFile {
                        index,
                        file_name,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let draft = PhotoDraft::new(paths.clone()).with_alt_text(options.alt_text.clone());
            match self
                .registry
                .append(product.id, user, draft, report.photos.len())
                .await
            {
                Ok(photo) => report.photos.push(photo),
                Err(e) => {
                    tracing::error!("Failed to register {}: {}", file_name, e);
                    self.writer.remove(&paths).await;
                    return Err(e.into());
                }
            }
        }

        tracing::info!(
            "Product {}: {} in {:?}",
            product.id,
            report.message(),
            start.elapsed()
        );
        Ok(report)
    }

    /// Decode, render and store one file. Returns the stored variant paths.
    async fn process_file(
        &self,
        atelier: AtelierId,
        file: UploadFile,
    ) -> std::result::Result<VariantPaths, AtelierError> {
        let start = Instant::now();
        let UploadFile {
            file_name,
            mime_type,
            bytes,
        } = file;

        // Decode
        let decoded = self.decoder.decode(bytes, &mime_type, &file_name).await?;
        let decode_time = start.elapsed();
        tracing::trace!("  Decode: {:?}", decode_time);
        let (width, height, format) = (decoded.width, decoded.height, decoded.format);

        // Resize + encode
        let render_start = Instant::now();
        let renderer = self.renderer.clone();
        let image = decoded.image;
        let variants = tokio::task::spawn_blocking(move || renderer.render_all(&image))
            .await
            .map_err(|e| PipelineError::Encode {
                variant: "all".to_string(),
                message: format!("Task join error: {}", e),
            })??;
        tracing::trace!("  Render: {:?}", render_start.elapsed());

        // Store
        let store_start = Instant::now();
        let paths = self.writer.write(atelier, &variants).await?;
        tracing::trace!("  Store: {:?}", store_start.elapsed());

        tracing::debug!(
            "Processed {} ({} {}x{}) in {:?}",
            file_name,
            format_to_string(format),
            width,
            height,
            start.elapsed()
        );
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::ValidationError;
    use crate::storage::MemoryStorage;
    use crate::error::RegistryError;
    use crate::types::ProductId;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut out, format)
            .unwrap();
        out.into_inner()
    }

    fn setup() -> (UploadProcessor, Arc<MemoryStorage>, ProductRef) {
        let mut catalog = Catalog::new();
        catalog.add_atelier(AtelierId(1), UserId(7));
        let product = catalog.add_product(ProductId(3), AtelierId(1)).unwrap();
        let storage = Arc::new(MemoryStorage::default());
        let registry = Arc::new(PhotoRegistry::new(Arc::new(catalog), storage.clone()));
        (
            UploadProcessor::new(&Config::default(), registry),
            storage,
            product,
        )
    }

    #[test]
    fn test_upload_options_default() {
        assert!(UploadOptions::default().alt_text.is_none());
    }

    #[tokio::test]
    async fn test_validation_failure_has_no_side_effects() {
        let (processor, storage, product) = setup();
        let files = vec![
            UploadFile::new("a.png", "image/png", encoded(10, 10, ImageFormat::Png)),
            UploadFile::new("b.bmp", "image/bmp", vec![1, 2, 3]),
        ];
        let err = processor
            .upload_batch(&product, files, UserId(7))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AtelierError::Validation(ValidationError::UnsupportedType { index: 1, .. })
        ));
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_foreign_atelier_in_product_ref_is_refused() {
        let (processor, storage, product) = setup();
        let forged = ProductRef {
            id: product.id,
            atelier_id: AtelierId(2),
        };
        let files = vec![UploadFile::new(
            "a.png",
            "image/png",
            encoded(10, 10, ImageFormat::Png),
        )];
        let err = processor
            .upload_batch(&forged, files, UserId(7))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AtelierError::Registry(RegistryError::Forbidden { .. })
        ));
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_variants_land_under_product_atelier() {
        let (processor, storage, product) = setup();
        let files = vec![UploadFile::new(
            "a.png",
            "image/png",
            encoded(10, 10, ImageFormat::Png),
        )];
        let report = processor
            .upload_batch(&product, files, UserId(7))
            .await
            .unwrap();
        assert!(report.photos[0]
            .paths
            .original
            .starts_with("product_photos/1/original/"));
        assert!(storage
            .paths()
            .await
            .iter()
            .all(|p| p.starts_with("product_photos/1/")));
    }

    #[tokio::test]
    async fn test_skipped_first_file_does_not_block_cover() {
        let (processor, _, product) = setup();
        let files = vec![
            UploadFile::new("broken.png", "image/png", vec![0x89, b'P', b'N', b'G']),
            UploadFile::new("ok.png", "image/png", encoded(20, 10, ImageFormat::Png)),
        ];
        let report = processor
            .upload_batch(&product, files, UserId(7))
            .await
            .unwrap();
        assert_eq!(report.photos.len(), 1);
        assert!(report.photos[0].is_cover);
        assert_eq!(report.photos[0].position, 1);
        assert_eq!(report.skipped[0].index, 0);
    }

    #[tokio::test]
    async fn test_alt_text_applies_to_batch() {
        let (processor, _, product) = setup();
        let options = UploadOptions {
            alt_text: Some("Hand-thrown bowl".into()),
        };
        let files = vec![UploadFile::new(
            "a.png",
            "image/png",
            encoded(10, 10, ImageFormat::Png),
        )];
        let report = processor
            .upload_batch_with_options(&product, files, UserId(7), &options)
            .await
            .unwrap();
        assert_eq!(
            report.photos[0].alt_text.as_deref(),
            Some("Hand-thrown bowl")
        );
    }
}
