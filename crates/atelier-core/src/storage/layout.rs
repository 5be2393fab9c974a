//! Storage path layout.
//!
//! ```text
//! product_photos/{atelierId}/original/{uuid}.jpg
//! product_photos/{atelierId}/medium/{uuid}.jpg
//! product_photos/{atelierId}/thumbs/{uuid}.jpg
//! ateliers/{atelierId}/lp/{uuid}.{ext}
//! ```

use uuid::Uuid;

use crate::pipeline::variants::{VariantKind, VARIANT_EXTENSION};
use crate::types::{AtelierId, VariantPaths};

/// Root directory of product photo variants.
pub const PRODUCT_PHOTOS_DIR: &str = "product_photos";

/// Logical path of one variant of the upload identified by `stem`.
pub fn variant_path(atelier: AtelierId, kind: VariantKind, stem: &Uuid) -> String {
    format!(
        "{PRODUCT_PHOTOS_DIR}/{atelier}/{}/{stem}.{VARIANT_EXTENSION}",
        kind.dir_name()
    )
}

/// Logical paths of all three variants sharing `stem`.
pub fn variant_paths(atelier: AtelierId, stem: &Uuid) -> VariantPaths {
    VariantPaths {
        original: variant_path(atelier, VariantKind::Original, stem),
        medium: variant_path(atelier, VariantKind::Medium, stem),
        thumb: variant_path(atelier, VariantKind::Thumb, stem),
    }
}

/// Logical path of a landing-page image.
pub fn lp_image_path(atelier: AtelierId, stem: &Uuid, extension: &str) -> String {
    format!("ateliers/{atelier}/lp/{stem}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_paths_share_stem() {
        let stem = Uuid::nil();
        let paths = variant_paths(AtelierId(12), &stem);
        assert_eq!(
            paths.original,
            "product_photos/12/original/00000000-0000-0000-0000-000000000000.jpg"
        );
        assert_eq!(
            paths.medium,
            "product_photos/12/medium/00000000-0000-0000-0000-000000000000.jpg"
        );
        assert_eq!(
            paths.thumb,
            "product_photos/12/thumbs/00000000-0000-0000-0000-000000000000.jpg"
        );
    }

    #[test]
    fn test_lp_path() {
        let stem = Uuid::nil();
        assert_eq!(
            lp_image_path(AtelierId(3), &stem, "png"),
            "ateliers/3/lp/00000000-0000-0000-0000-000000000000.png"
        );
    }
}
