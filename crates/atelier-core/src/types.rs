//! Core data types for the Atelier photo pipeline.
//!
//! Identifiers, the `ProductPhoto` record kept by the gallery registry, and
//! the request/response shapes exchanged with the upload intake.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of an authenticated user.
    UserId
);
id_type!(
    /// Identifier of an atelier (tenant shop).
    AtelierId
);
id_type!(
    /// Identifier of a product.
    ProductId
);
id_type!(
    /// Identifier of a product photo, assigned by the registry.
    PhotoId
);

/// A product as seen by the photo engine: its id and owning atelier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub atelier_id: AtelierId,
}

/// An atelier and the user who owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtelierRef {
    pub id: AtelierId,
    pub user_id: UserId,
}

/// Storage-relative paths of the three variants of one uploaded photo.
///
/// The three paths share a filename stem and differ only by directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPaths {
    #[serde(rename = "original_path")]
    pub original: String,
    #[serde(rename = "medium_path")]
    pub medium: String,
    #[serde(rename = "thumb_path")]
    pub thumb: String,
}

impl VariantPaths {
    /// All three paths, largest first.
    pub fn all(&self) -> [&str; 3] {
        [
            self.original.as_str(),
            self.medium.as_str(),
            self.thumb.as_str(),
        ]
    }
}

/// One photo in a product's gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPhoto {
    pub id: PhotoId,

    /// Owning product, fixed at creation
    pub product_id: ProductId,

    #[serde(flatten)]
    pub paths: VariantPaths,

    /// Legacy or externally hosted image, preferred over stored paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,

    pub is_cover: bool,

    /// Display order; neither unique nor contiguous
    pub position: i64,

    pub created_at: SystemTime,

    /// Soft-delete tombstone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<SystemTime>,
}

impl ProductPhoto {
    /// Whether the photo is live (not tombstoned).
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// URLs a display layer should use for one photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayUrls {
    pub original: String,
    pub medium: String,
    pub thumb: String,
}

/// A single uploaded file as received from the multipart form.
#[derive(Clone)]
pub struct UploadFile {
    /// Client-supplied filename (used for logs and error messages only)
    pub file_name: String,
    /// Declared MIME type (e.g. `image/jpeg`)
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Size of the upload in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// One `{id, position}` pair of a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderEntry {
    pub id: PhotoId,
    pub position: i64,
}

/// A file of an accepted batch that produced no photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    /// Index of the file in submission order
    pub index: usize,
    pub file_name: String,
    pub reason: String,
}

/// Result of an upload batch: created photos plus files skipped on the way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadReport {
    pub photos: Vec<ProductPhoto>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub skipped: Vec<SkippedFile>,
}

impl UploadReport {
    /// Human-readable summary of the batch.
    pub fn message(&self) -> String {
        let mut message = format!("{} photo(s) uploaded successfully", self.photos.len());
        if !self.skipped.is_empty() {
            message.push_str(&format!(
                "; {} file(s) skipped because they could not be processed",
                self.skipped.len()
            ));
        }
        message
    }
}

/// Landing-page image slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LpImageKind {
    Hero,
    Logo,
}

impl fmt::Display for LpImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LpImageKind::Hero => write!(f, "hero"),
            LpImageKind::Logo => write!(f, "logo"),
        }
    }
}

/// A stored landing-page image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpImage {
    pub url: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: LpImageKind,
}
