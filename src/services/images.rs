//! Uploaded product images: storing multipart file parts and turning stored
//! references into URLs the storefront can load.

use chrono::Utc;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// Resolves stored image references against the public `/uploads` mount.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    public_base_url: String,
    upload_dir: PathBuf,
}

impl ImageUrls {
    pub fn new(public_base_url: impl Into<String>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_base_url: public_base_url.into(),
            upload_dir: upload_dir.into(),
        }
    }

    /// Absolute URLs pass through untouched. Anything else is treated as a
    /// path under the upload dir; a missing extension is recovered from the
    /// file on disk, falling back to `.png`.
    pub fn format(&self, stored: Option<&str>) -> Option<String> {
        let stored = stored.map(str::trim).filter(|s| !s.is_empty())?;

        if stored.starts_with("http://") || stored.starts_with("https://") {
            return Some(stored.to_string());
        }

        let normalized = stored.replace('\\', "/");
        let trimmed = normalized.trim_start_matches('/');
        let mut path = trimmed.strip_prefix("uploads/").unwrap_or(trimmed).to_string();

        if !has_image_extension(&path) {
            let found = IMAGE_EXTENSIONS
                .iter()
                .find(|ext| self.upload_dir.join(format!("{}.{}", path, ext)).is_file());
            path = format!("{}.{}", path, found.copied().unwrap_or("png"));
        }

        Some(format!("{}/uploads/{}", self.public_base_url, path))
    }

    /// Writes an uploaded file part and returns the reference to store in the
    /// product row (`uploads/<file>`). Only image extensions survive from the
    /// client's file name; anything else is stored as `.png`.
    pub async fn store_upload(
        &self,
        field: &str,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> std::io::Result<String> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let ext = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or_else(|| "png".to_string());

        let suffix: u32 = rand::random_range(0..1_000_000_000);
        let file_name = format!("{}-{}-{}.{}", field, Utc::now().timestamp_millis(), suffix, ext);

        tokio::fs::write(self.upload_dir.join(&file_name), bytes).await?;
        tracing::debug!(file = %file_name, size = bytes.len(), "Stored upload");

        Ok(format!("uploads/{}", file_name))
    }

    /// Removes files written by [`ImageUrls::store_upload`] when the row that
    /// would reference them was never saved.
    pub async fn discard(&self, stored: &[String]) {
        for reference in stored {
            let Some(file) = reference.strip_prefix("uploads/") else {
                continue;
            };
            if let Err(e) = tokio::fs::remove_file(self.upload_dir.join(file)).await {
                tracing::warn!(file = %file, error = %e, "Failed to remove unsaved upload");
            }
        }
    }
}

fn has_image_extension(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
