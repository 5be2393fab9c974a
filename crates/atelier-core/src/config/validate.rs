//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, VariantBox};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_batch_files == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_batch_files must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        validate_variant("variants.original", &self.variants.original)?;
        validate_variant("variants.medium", &self.variants.medium)?;
        validate_variant("variants.thumb", &self.variants.thumb)?;
        Ok(())
    }
}

fn validate_variant(name: &str, variant: &VariantBox) -> Result<(), ConfigError> {
    if variant.width == 0 || variant.height == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{name} width and height must be > 0"
        )));
    }
    if variant.quality == 0 || variant.quality > 100 {
        return Err(ConfigError::ValidationError(format!(
            "{name}.quality must be between 1 and 100"
        )));
    }
    Ok(())
}
