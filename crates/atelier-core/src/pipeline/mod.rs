//! Image processing pipeline components.
//!
//! This module contains all the stages of the upload pipeline:
//! - **validate**: Intake validation of declared type, size and count
//! - **decode**: Decode uploaded bytes by declared MIME type
//! - **resize**: Fit and crop-fit dimension math and resampling
//! - **variants**: Render and JPEG-encode the three variants
//! - **processor**: Orchestrates a product photo batch
//! - **lp**: Landing-page image intake (stored as-is)

pub mod decode;
pub mod lp;
pub mod processor;
pub mod resize;
pub mod validate;
pub mod variants;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use lp::LpImageUploader;
pub use processor::{UploadOptions, UploadProcessor};
pub use resize::{ResizeMode, Resizer};
pub use validate::Validator;
pub use variants::{RenderedVariant, VariantKind, VariantRenderer};
