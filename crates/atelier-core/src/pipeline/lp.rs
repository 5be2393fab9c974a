//! Landing-page (hero / logo) image intake.
//!
//! LP images are stored as uploaded: no decode, no variants.

use std::sync::Arc;
use uuid::Uuid;

use crate::config::LimitsConfig;
use crate::error::{Result, ValidationError};
use crate::registry::{authorize_atelier, Ownership};
use crate::storage::{lp_image_path, ObjectStorage};
use crate::types::{AtelierRef, LpImage, LpImageKind, UploadFile, UserId};

use super::validate::{extension_for, Validator};

pub struct LpImageUploader {
    validator: Validator,
    ownership: Arc<dyn Ownership>,
    storage: Arc<dyn ObjectStorage>,
}

impl LpImageUploader {
    pub fn new(
        limits: LimitsConfig,
        ownership: Arc<dyn Ownership>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            validator: Validator::new(limits),
            ownership,
            storage,
        }
    }

    /// Store a hero or logo image for `atelier`.
    pub async fn upload(
        &self,
        atelier: &AtelierRef,
        user: UserId,
        kind: LpImageKind,
        file: UploadFile,
    ) -> Result<LpImage> {
        authorize_atelier(self.ownership.as_ref(), atelier.id, user)?;
        self.validator.validate_file(0, &file)?;

        let extension =
            extension_for(&file.mime_type).ok_or_else(|| ValidationError::UnsupportedType {
                index: 0,
                file_name: file.file_name.clone(),
                mime_type: file.mime_type.clone(),
            })?;

        let path = lp_image_path(atelier.id, &Uuid::new_v4(), extension);
        let stored = self.storage.write(&path, &file.bytes).await?;
        tracing::info!(
            "Stored {} image for atelier {} at {} ({} bytes)",
            kind,
            atelier.id,
            stored.path,
            file.size()
        );

        Ok(LpImage {
            url: stored.url,
            path: stored.path,
            kind,
        })
    }
}
