//! Output formatting for photo listings and upload results.
//!
//! Records can be printed as a single JSON document, as JSON Lines, or as
//! one human-readable line per photo.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::{DisplayUrls, PhotoId, ProductId, ProductPhoto};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
    /// One aligned text line per photo
    Text,
}

/// A photo together with the URLs a display layer should use.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoView {
    pub id: PhotoId,
    pub product_id: ProductId,
    pub position: i64,
    pub is_cover: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    pub urls: DisplayUrls,
}

impl PhotoView {
    pub fn new(photo: &ProductPhoto, urls: DisplayUrls) -> Self {
        Self {
            id: photo.id,
            product_id: photo.product_id,
            position: photo.position,
            is_cover: photo.is_cover,
            alt_text: photo.alt_text.clone(),
            urls,
        }
    }

    /// Single-line text rendering.
    pub fn text_line(&self) -> String {
        let mut line = format!(
            "#{:<6} pos {:<4} {:<7} {}",
            self.id,
            self.position,
            if self.is_cover { "[cover]" } else { "" },
            self.urls.thumb
        );
        if let Some(alt) = &self.alt_text {
            line.push_str(&format!("  \"{alt}\""));
        }
        line
    }
}

/// A writer that prints photo views in the selected format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer. `pretty` only affects JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a serializable value as JSON, regardless of format.
    ///
    /// Used for non-photo results (upload reports, LP images).
    pub fn write_value<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        if self.pretty && self.format != OutputFormat::JsonLines {
            serde_json::to_writer_pretty(&mut self.writer, value).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, value).map_err(io::Error::other)?;
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write a single photo.
    pub fn write_photo(&mut self, photo: &PhotoView) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.writer, "{}", photo.text_line())?;
                self.items_written += 1;
                Ok(())
            }
            OutputFormat::Json | OutputFormat::JsonLines => self.write_value(photo),
        }
    }

    /// Write a listing.
    ///
    /// JSON prints one array; JSON Lines and text print one line per photo.
    pub fn write_photos(&mut self, photos: &[PhotoView]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, photos)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, photos).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.items_written += photos.len();
            }
            OutputFormat::JsonLines | OutputFormat::Text => {
                for photo in photos {
                    self.write_photo(photo)?;
                }
            }
        }
        Ok(())
    }

    /// Write a plain message line (ignored by JSON formats).
    pub fn write_message(&mut self, message: &str) -> io::Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(self.writer, "{message}")?;
        }
        Ok(())
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: u64, position: i64, is_cover: bool) -> PhotoView {
        PhotoView {
            id: PhotoId(id),
            product_id: ProductId(1),
            position,
            is_cover,
            alt_text: None,
            urls: DisplayUrls {
                original: format!("/storage/o/{id}.jpg"),
                medium: format!("/storage/m/{id}.jpg"),
                thumb: format!("/storage/t/{id}.jpg"),
            },
        }
    }

    #[test]
    fn test_json_listing_is_array() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer
            .write_photos(&[view(1, 1, true), view(2, 2, false)])
            .unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(buffer).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["is_cover"], true);
        assert_eq!(parsed[1]["urls"]["thumb"], "/storage/t/2.jpg");
    }

    #[test]
    fn test_jsonl_one_line_per_photo() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer
            .write_photos(&[view(1, 1, true), view(2, 2, false), view(3, 3, false)])
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output.trim().lines().count(), 3);
    }

    #[test]
    fn test_text_marks_cover() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Text, false);
        writer.write_photos(&[view(1, 1, true)]).unwrap();
        writer.write_message("1 photo(s)").unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].contains("[cover]"));
        assert!(lines[0].ends_with("/storage/t/1.jpg"));
        assert_eq!(lines[1], "1 photo(s)");
    }

    #[test]
    fn test_messages_skipped_in_json() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write_message("ignored").unwrap();
        assert!(writer.into_inner().is_empty());
    }
}
