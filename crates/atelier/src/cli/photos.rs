//! The `atelier photos` command for product galleries.

use anyhow::Context;
use atelier_core::pipeline::validate::mime_for_extension;
use atelier_core::{
    Config, OutputFormat, OutputWriter, PhotoId, PhotoView, ProductId, ReorderEntry,
    UploadFile, UploadOptions, UserId,
};
use clap::{Args, Subcommand, ValueEnum};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::state::StateFiles;

/// Arguments for the `photos` command.
#[derive(Args, Debug)]
pub struct PhotosArgs {
    #[command(subcommand)]
    pub command: PhotosCommand,
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ListFormat {
    #[default]
    Text,
    Json,
    Jsonl,
}

impl From<ListFormat> for OutputFormat {
    fn from(format: ListFormat) -> Self {
        match format {
            ListFormat::Text => OutputFormat::Text,
            ListFormat::Json => OutputFormat::Json,
            ListFormat::Jsonl => OutputFormat::JsonLines,
        }
    }
}

/// Subcommands for gallery management.
#[derive(Subcommand, Debug)]
pub enum PhotosCommand {
    /// Upload up to 10 image files to a product
    Upload {
        #[arg(long)]
        product: u64,
        #[arg(long)]
        user: u64,
        /// Alt text stored on every uploaded photo
        #[arg(long)]
        alt_text: Option<String>,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List a product's photos in display order
    List {
        #[arg(long)]
        product: u64,
        #[arg(short, long, value_enum, default_value = "text")]
        format: ListFormat,
    },

    /// Delete a photo and its stored files
    Delete {
        #[arg(long)]
        product: u64,
        #[arg(long)]
        photo: u64,
        #[arg(long)]
        user: u64,
    },

    /// Make a photo the product's cover
    Cover {
        #[arg(long)]
        product: u64,
        #[arg(long)]
        photo: u64,
        #[arg(long)]
        user: u64,
    },

    /// Set positions from a JSON array of {"id", "position"} pairs
    Reorder {
        #[arg(long)]
        product: u64,
        #[arg(long)]
        user: u64,
        #[arg(long)]
        order: String,
    },

    /// Bring back a deleted photo
    Restore {
        #[arg(long)]
        product: u64,
        #[arg(long)]
        photo: u64,
        #[arg(long)]
        user: u64,
    },

    /// List deleted photos of a product
    Trashed {
        #[arg(long)]
        product: u64,
        #[arg(long)]
        user: u64,
    },
}

/// Read a file from disk as an upload, inferring its MIME type from the extension.
///
/// Unknown extensions are declared as `application/octet-stream` so that
/// intake validation rejects them with a field-level error.
pub fn read_upload_file(path: &Path) -> anyhow::Result<UploadFile> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mime_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_for_extension)
        .unwrap_or("application/octet-stream");
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();
    Ok(UploadFile::new(file_name, mime_type, bytes))
}

/// Parse the `--order` argument.
pub fn parse_order(json: &str) -> anyhow::Result<Vec<ReorderEntry>> {
    serde_json::from_str(json).context("--order must be a JSON array of {\"id\", \"position\"}")
}

/// Execute the photos command.
pub async fn execute(args: PhotosArgs, config: Config) -> anyhow::Result<()> {
    let files = StateFiles::new(&config);
    let atelier = files.open(config)?;

    let format: OutputFormat = match &args.command {
        PhotosCommand::List { format, .. } => (*format).into(),
        _ => OutputFormat::Text,
    };
    let stdout = std::io::stdout();
    let mut out = OutputWriter::new(BufWriter::new(stdout.lock()), format, true);

    match args.command {
        PhotosCommand::Upload {
            product,
            user,
            alt_text,
            files: paths,
        } => {
            let product = atelier.product(ProductId(product))?;
            let uploads = paths
                .iter()
                .map(|path| read_upload_file(path))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let options = UploadOptions { alt_text };

            let report = atelier
                .upload_photos_with_options(&product, uploads, UserId(user), &options)
                .await?;
            files.persist(&atelier).await?;

            let views: Vec<PhotoView> = report
                .photos
                .iter()
                .map(|p| PhotoView::new(p, atelier.registry().display_urls(p)))
                .collect();
            out.write_photos(&views)?;
            for skipped in &report.skipped {
                out.write_message(&format!(
                    "skipped {} (#{}): {}",
                    skipped.file_name, skipped.index, skipped.reason
                ))?;
            }
            out.write_message(&report.message())?;
        }

        PhotosCommand::List { product, .. } => {
            let views = atelier.list(ProductId(product)).await;
            out.write_photos(&views)?;
        }

        PhotosCommand::Delete {
            product,
            photo,
            user,
        } => {
            let removed = atelier
                .delete_photo(ProductId(product), UserId(user), PhotoId(photo))
                .await?;
            files.persist(&atelier).await?;
            out.write_message(&format!("Deleted photo {}", removed.id))?;
            if let Some(cover) = atelier.cover(ProductId(product)).await {
                out.write_message(&format!("Cover is now photo {}", cover.id))?;
            }
        }

        PhotosCommand::Cover {
            product,
            photo,
            user,
        } => {
            let updated = atelier
                .set_cover(ProductId(product), UserId(user), PhotoId(photo))
                .await?;
            files.persist(&atelier).await?;
            out.write_message(&format!("Photo {} is now the cover", updated.id))?;
        }

        PhotosCommand::Reorder {
            product,
            user,
            order,
        } => {
            let entries = parse_order(&order)?;
            let updated = atelier
                .reorder(ProductId(product), UserId(user), &entries)
                .await?;
            files.persist(&atelier).await?;
            out.write_message(&format!(
                "Updated {} of {} position(s)",
                updated,
                entries.len()
            ))?;
        }

        PhotosCommand::Restore {
            product,
            photo,
            user,
        } => {
            let restored = atelier
                .restore_photo(ProductId(product), UserId(user), PhotoId(photo))
                .await?;
            files.persist(&atelier).await?;
            let view = PhotoView::new(&restored, atelier.registry().display_urls(&restored));
            out.write_photo(&view)?;
        }

        PhotosCommand::Trashed { product, user } => {
            let trashed = atelier.trashed(ProductId(product), UserId(user)).await?;
            let views: Vec<PhotoView> = trashed
                .iter()
                .map(|p| PhotoView::new(p, atelier.registry().display_urls(p)))
                .collect();
            out.write_photos(&views)?;
            out.write_message(&format!("{} deleted photo(s)", trashed.len()))?;
        }
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_upload_infers_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Front.JPEG");
        std::fs::write(&path, b"bytes").unwrap();

        let file = read_upload_file(&path).unwrap();
        assert_eq!(file.file_name, "Front.JPEG");
        assert_eq!(file.mime_type, "image/jpeg");
        assert_eq!(file.bytes, b"bytes");
    }

    #[test]
    fn test_unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"x").unwrap();
        assert_eq!(
            read_upload_file(&path).unwrap().mime_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(read_upload_file(Path::new("/definitely/not/here.jpg")).is_err());
    }

    #[test]
    fn test_parse_order() {
        let entries = parse_order(r#"[{"id":5,"position":2},{"id":7,"position":1}]"#).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].id, PhotoId(7));
        assert!(parse_order("5,2").is_err());
    }
}
