//! Raster decoding from uploaded bytes, driven by the declared MIME type.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded pixel buffer
    pub image: DynamicImage,
    /// Format the bytes were decoded as
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode uploaded bytes on the blocking pool, with timeout and dimension checks.
    pub async fn decode(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        file_name: &str,
    ) -> Result<DecodedImage, PipelineError> {
        let mime_owned = mime_type.to_string();
        let name_owned = file_name.to_string();
        let decoded = self
            .run_guarded(file_name, move || {
                decode_bytes(&bytes, &mime_owned, &name_owned)
            })
            .await?;

        if decoded.width > self.limits.max_image_dimension
            || decoded.height > self.limits.max_image_dimension
        {
            return Err(PipelineError::ImageTooLarge {
                file_name: file_name.to_string(),
                width: decoded.width,
                height: decoded.height,
                max_dim: self.limits.max_image_dimension,
            });
        }
        Ok(decoded)
    }

    /// Run a decode job on the blocking pool under the configured timeout.
    async fn run_guarded<F>(&self, file_name: &str, job: F) -> Result<DecodedImage, PipelineError>
    where
        F: FnOnce() -> Result<DecodedImage, PipelineError> + Send + 'static,
    {
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);
        let result = timeout(timeout_duration, tokio::task::spawn_blocking(job)).await;

        match result {
            Ok(Ok(decoded)) => decoded,
            Ok(Err(e)) => Err(PipelineError::Decode {
                file_name: file_name.to_string(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                file_name: file_name.to_string(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }
}

/// Map a declared MIME type to the decoder to use.
///
/// JPEG, PNG and WebP are decoded as declared; anything else is attempted as JPEG.
pub fn decoder_format(mime_type: &str) -> ImageFormat {
    let essence = mime_type.split(';').next().unwrap_or_default();
    match essence.trim().to_ascii_lowercase().as_str() {
        "image/png" => ImageFormat::Png,
        "image/webp" => ImageFormat::WebP,
        _ => ImageFormat::Jpeg,
    }
}

/// Synchronous decode of `bytes` with the decoder selected by `mime_type`.
pub fn decode_bytes(
    bytes: &[u8],
    mime_type: &str,
    file_name: &str,
) -> Result<DecodedImage, PipelineError> {
    let format = decoder_format(mime_type);
    let reader = image::ImageReader::with_format(Cursor::new(bytes), format);
    let image = reader.decode().map_err(|e| PipelineError::Decode {
        file_name: file_name.to_string(),
        message: format!("not a valid {}: {}", format_to_string(format), e),
    })?;

    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        image,
        format,
        width,
        height,
    })
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_decoder_format_mapping() {
        assert_eq!(decoder_format("image/png"), ImageFormat::Png);
        assert_eq!(decoder_format("IMAGE/WEBP"), ImageFormat::WebP);
        assert_eq!(decoder_format("image/jpeg"), ImageFormat::Jpeg);
        assert_eq!(decoder_format("image/gif"), ImageFormat::Jpeg);
        assert_eq!(decoder_format("application/octet-stream"), ImageFormat::Jpeg);
    }

    #[test]
    fn test_decode_png_reports_dimensions() {
        let bytes = encode(&DynamicImage::new_rgb8(64, 48), ImageFormat::Png);
        let decoded = decode_bytes(&bytes, "image/png", "a.png").unwrap();
        assert_eq!((decoded.width, decoded.height), (64, 48));
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[test]
    fn test_decode_jpeg() {
        let bytes = encode(&DynamicImage::new_rgb8(30, 20), ImageFormat::Jpeg);
        let decoded = decode_bytes(&bytes, "image/jpeg", "a.jpg").unwrap();
        assert_eq!((decoded.width, decoded.height), (30, 20));
    }

    #[test]
    fn test_corrupt_bytes_fail() {
        let err = decode_bytes(b"definitely not a png", "image/png", "bad.png")
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::Decode { .. }));
        assert!(err.to_string().contains("bad.png"));
    }

    #[test]
    fn test_unknown_mime_falls_back_to_jpeg() {
        let jpeg = encode(&DynamicImage::new_rgb8(10, 10), ImageFormat::Jpeg);
        let decoded = decode_bytes(&jpeg, "image/x-unknown", "a.bin").unwrap();
        assert_eq!(decoded.format, ImageFormat::Jpeg);

        // PNG bytes declared as GIF go through the JPEG decoder and fail
        let png = encode(&DynamicImage::new_rgb8(10, 10), ImageFormat::Png);
        assert!(decode_bytes(&png, "image/gif", "a.gif").is_err());
    }

    #[test]
    fn test_decode_lossless_webp() {
        let source = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            24,
            12,
            image::Rgba([200, 100, 50, 255]),
        ));
        let bytes = encode(&source, ImageFormat::WebP);
        let decoded = decode_bytes(&bytes, "image/webp", "a.webp").unwrap();
        assert_eq!(decoded.format, ImageFormat::WebP);
        assert_eq!((decoded.width, decoded.height), (24, 12));
        assert_eq!(decoded.image.to_rgba8().get_pixel(3, 3).0, [200, 100, 50, 255]);
    }

    #[tokio::test]
    async fn test_slow_decode_times_out() {
        let limits = LimitsConfig {
            decode_timeout_ms: 20,
            ..LimitsConfig::default()
        };
        let decoder = ImageDecoder::new(limits);
        let err = decoder
            .run_guarded("slow.jpg", || {
                std::thread::sleep(Duration::from_millis(300));
                decode_bytes(&[], "image/jpeg", "slow.jpg")
            })
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            PipelineError::Timeout { timeout_ms: 20, ref stage, .. } if stage == "decode"
        ));
        assert!(err.to_string().contains("slow.jpg"));
    }

    #[tokio::test]
    async fn test_async_decode_rejects_oversized_image() {
        let limits = LimitsConfig {
            max_image_dimension: 32,
            ..LimitsConfig::default()
        };
        let decoder = ImageDecoder::new(limits);
        let bytes = encode(&DynamicImage::new_rgb8(64, 16), ImageFormat::Png);
        let err = decoder
            .decode(bytes, "image/png", "wide.png")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::ImageTooLarge { width: 64, .. }));
    }
}
