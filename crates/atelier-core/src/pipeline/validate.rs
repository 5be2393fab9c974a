//! Intake validation before any decode work.
//!
//! Checks only what the request declares (count, MIME type, size). Whether
//! the bytes really are an image is left to the decoder, whose failures are
//! per-file rather than batch-fatal.

use crate::config::LimitsConfig;
use crate::error::ValidationError;
use crate::types::UploadFile;

/// MIME types accepted at intake, with the extension used when storing raw copies.
pub const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// Maximum alt text length (matches the stored column).
pub const MAX_ALT_TEXT_CHARS: usize = 160;

/// Normalize a declared MIME type for comparison.
fn normalize(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether `mime_type` is an accepted image type.
pub fn is_accepted_type(mime_type: &str) -> bool {
    extension_for(mime_type).is_some()
}

/// Storage extension for an accepted MIME type.
pub fn extension_for(mime_type: &str) -> Option<&'static str> {
    let normalized = normalize(mime_type);
    ACCEPTED_TYPES
        .iter()
        .find(|(mime, _)| *mime == normalized)
        .map(|(_, ext)| *ext)
}

/// Guess a MIME type from a file extension (used by the CLI).
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Validates upload requests before processing.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Validate a photo batch.
    ///
    /// Checks:
    /// - Batch is non-empty and within the file count limit
    /// - Every file declares an accepted image type
    /// - Every file is non-empty and within the size limit
    ///
    /// The first failure rejects the whole batch.
    pub fn validate_batch(&self, files: &[UploadFile]) -> Result<(), ValidationError> {
        if files.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        if files.len() > self.limits.max_batch_files {
            return Err(ValidationError::TooManyFiles {
                count: files.len(),
                max: self.limits.max_batch_files,
            });
        }
        for (index, file) in files.iter().enumerate() {
            self.validate_file(index, file)?;
        }
        Ok(())
    }

    /// Validate a single file at position `index`.
    pub fn validate_file(&self, index: usize, file: &UploadFile) -> Result<(), ValidationError> {
        if !is_accepted_type(&file.mime_type) {
            return Err(ValidationError::UnsupportedType {
                index,
                file_name: file.file_name.clone(),
                mime_type: file.mime_type.clone(),
            });
        }
        if file.bytes.is_empty() {
            return Err(ValidationError::EmptyFile {
                index,
                file_name: file.file_name.clone(),
            });
        }
        if file.size() > self.limits.max_file_size_bytes() {
            return Err(ValidationError::FileTooLarge {
                index,
                file_name: file.file_name.clone(),
                size_bytes: file.size(),
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(())
    }

    /// Validate optional alt text.
    pub fn validate_alt_text(alt_text: Option<&str>) -> Result<(), ValidationError> {
        if let Some(text) = alt_text {
            let len = text.chars().count();
            if len > MAX_ALT_TEXT_CHARS {
                return Err(ValidationError::AltTextTooLong {
                    len,
                    max: MAX_ALT_TEXT_CHARS,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: &str, size: usize) -> UploadFile {
        UploadFile::new(name, mime, vec![0u8; size])
    }

    fn validator() -> Validator {
        Validator::new(LimitsConfig::default())
    }

    #[test]
    fn test_accepted_types() {
        assert!(is_accepted_type("image/jpeg"));
        assert!(is_accepted_type("image/jpg"));
        assert!(is_accepted_type("IMAGE/PNG"));
        assert!(is_accepted_type("image/webp; charset=binary"));
        assert!(is_accepted_type("image/gif"));
        assert!(!is_accepted_type("image/tiff"));
        assert!(!is_accepted_type("application/pdf"));
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/webp"), Some("webp"));
        assert_eq!(extension_for("text/plain"), None);
    }

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension("JPEG"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("png"), Some("image/png"));
        assert_eq!(mime_for_extension("heic"), None);
    }

    #[test]
    fn test_valid_batch() {
        let files = vec![file("a.jpg", "image/jpeg", 10), file("b.png", "image/png", 10)];
        assert!(validator().validate_batch(&files).is_ok());
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert_eq!(
            validator().validate_batch(&[]),
            Err(ValidationError::EmptyBatch)
        );
    }

    #[test]
    fn test_eleven_files_rejected() {
        let files: Vec<_> = (0..11)
            .map(|i| file(&format!("{i}.jpg"), "image/jpeg", 10))
            .collect();
        assert_eq!(
            validator().validate_batch(&files),
            Err(ValidationError::TooManyFiles { count: 11, max: 10 })
        );
    }

    #[test]
    fn test_ten_files_accepted() {
        let files: Vec<_> = (0..10)
            .map(|i| file(&format!("{i}.jpg"), "image/jpeg", 10))
            .collect();
        assert!(validator().validate_batch(&files).is_ok());
    }

    #[test]
    fn test_unsupported_type_names_index() {
        let files = vec![file("a.jpg", "image/jpeg", 10), file("b.pdf", "application/pdf", 10)];
        let err = validator().validate_batch(&files).unwrap_err();
        assert_eq!(err.field(), "photos.1");
        assert!(matches!(err, ValidationError::UnsupportedType { index: 1, .. }));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let limit = 5 * 1024 * 1024;
        assert!(validator()
            .validate_file(0, &file("ok.jpg", "image/jpeg", limit))
            .is_ok());
        let err = validator()
            .validate_file(0, &file("big.jpg", "image/jpeg", limit + 1))
            .unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { max_mb: 5, .. }));
    }

    #[test]
    fn test_empty_file_rejected() {
        let err = validator()
            .validate_file(2, &file("zero.png", "image/png", 0))
            .unwrap_err();
        assert_eq!(err.field(), "photos.2");
    }

    #[test]
    fn test_alt_text_limit() {
        assert!(Validator::validate_alt_text(None).is_ok());
        assert!(Validator::validate_alt_text(Some(&"a".repeat(160))).is_ok());
        assert!(Validator::validate_alt_text(Some(&"a".repeat(161))).is_err());
    }
}
