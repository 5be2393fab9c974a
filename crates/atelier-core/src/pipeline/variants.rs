//! The three photo variants and their JPEG encoding.
//!
//! | Variant | Default box | Mode | Quality | Directory |
//! |---|---|---|---|---|
//! | original | 2000x2000 | fit | 85 | `original` |
//! | medium | 800x800 | fit | 80 | `medium` |
//! | thumb | 400x400 | crop-fit | 75 | `thumbs` |
//!
//! Every input format is normalized to baseline JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{VariantBox, VariantsConfig};
use crate::error::PipelineError;

use super::resize::{ResizeMode, Resizer};

/// File extension of every encoded variant.
pub const VARIANT_EXTENSION: &str = "jpg";

/// One of the three derived sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Original,
    Medium,
    Thumb,
}

impl VariantKind {
    pub const ALL: [VariantKind; 3] = [
        VariantKind::Original,
        VariantKind::Medium,
        VariantKind::Thumb,
    ];

    /// Storage directory name. Persisted layout; do not change.
    pub fn dir_name(self) -> &'static str {
        match self {
            VariantKind::Original => "original",
            VariantKind::Medium => "medium",
            VariantKind::Thumb => "thumbs",
        }
    }

    pub fn mode(self) -> ResizeMode {
        match self {
            VariantKind::Original | VariantKind::Medium => ResizeMode::Fit,
            VariantKind::Thumb => ResizeMode::CropFit,
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantKind::Original => write!(f, "original"),
            VariantKind::Medium => write!(f, "medium"),
            VariantKind::Thumb => write!(f, "thumb"),
        }
    }
}

/// An encoded variant ready for storage.
#[derive(Debug, Clone)]
pub struct RenderedVariant {
    pub kind: VariantKind,
    pub width: u32,
    pub height: u32,
    /// JPEG bytes
    pub bytes: Vec<u8>,
}

/// Serializes pixel buffers to JPEG.
pub struct VariantEncoder;

impl VariantEncoder {
    /// Encode `image` as the `kind` variant in JPEG at `quality` (clamped to 1-100).
    ///
    /// Alpha is dropped; JPEG has no transparency.
    pub fn encode(
        image: &DynamicImage,
        kind: VariantKind,
        quality: u8,
    ) -> Result<Vec<u8>, PipelineError> {
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|e| PipelineError::Encode {
                variant: kind.to_string(),
                message: e.to_string(),
            })?;
        Ok(buffer)
    }
}

/// Renders all three variants from one decoded source.
#[derive(Debug, Clone)]
pub struct VariantRenderer {
    config: VariantsConfig,
    resizer: Resizer,
}

impl VariantRenderer {
    pub fn new(config: VariantsConfig) -> Self {
        Self {
            config,
            resizer: Resizer::default(),
        }
    }

    /// Box and quality configured for `kind`.
    pub fn spec(&self, kind: VariantKind) -> VariantBox {
        match kind {
            VariantKind::Original => self.config.original,
            VariantKind::Medium => self.config.medium,
            VariantKind::Thumb => self.config.thumb,
        }
    }

    /// Resize and encode one variant from the full source.
    pub fn render(
        &self,
        source: &DynamicImage,
        kind: VariantKind,
    ) -> Result<RenderedVariant, PipelineError> {
        let spec = self.spec(kind);
        let resized = self
            .resizer
            .resize(source, (spec.width, spec.height), kind.mode());
        let (width, height) = resized.dimensions();
        let bytes = VariantEncoder::encode(&resized, kind, spec.quality)?;
        Ok(RenderedVariant {
            kind,
            width,
            height,
            bytes,
        })
    }

    /// Render original, medium and thumb, in that order.
    pub fn render_all(
        &self,
        source: &DynamicImage,
    ) -> Result<Vec<RenderedVariant>, PipelineError> {
        VariantKind::ALL
            .iter()
            .map(|&kind| self.render(source, kind))
            .collect()
    }
}
