//! Disk storage for story images
//!
//! Files live flat under one directory as `<uuid>.<ext>` and are addressed by
//! the public URL `/uploads/<name>`.

use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const UPLOADS_PREFIX: &str = "/uploads/";

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Write an image and return its public URL.
    pub async fn save(&self, extension: &str, bytes: &[u8]) -> Result<String> {
        if bytes.len() > self.max_bytes {
            return Err(too_large(self.max_bytes));
        }

        let name = format!("{}.{}", Uuid::new_v4(), extension);
        tokio::fs::write(self.dir.join(&name), bytes).await?;

        tracing::debug!(file = %name, size = bytes.len(), "image stored");
        Ok(format!("{UPLOADS_PREFIX}{name}"))
    }

    /// Best-effort removal of a previously saved image.
    pub async fn remove(&self, image_url: &str) {
        let Some(path) = image_url
            .strip_prefix(UPLOADS_PREFIX)
            .and_then(|name| self.resolve(name))
        else {
            return;
        };

        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(error = %e, path = %path.display(), "failed to remove orphaned image");
        }
    }

    /// Path for a stored file name. `None` for anything that is not a bare file name.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_');
        valid.then(|| self.dir.join(name))
    }
}

pub fn too_large(max_bytes: usize) -> AppError {
    AppError::Validation(format!(
        "File too large. Maximum size is {}MB.",
        max_bytes / (1024 * 1024)
    ))
}

/// File extension for an upload: the client's own if it looks sane, otherwise
/// derived from the image subtype.
pub fn extension_for(filename: Option<&str>, content_type: &mime::Mime) -> String {
    let from_name = filename
        .and_then(|f| f.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.unwrap_or_else(|| match content_type.subtype().as_str() {
        "jpeg" => "jpg".to_string(),
        "svg+xml" => "svg".to_string(),
        other => other
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase(),
    })
}

/// Content type to serve a stored file with.
pub fn content_type_for(name: &str) -> mime::Mime {
    let ext = name.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("png") => mime::IMAGE_PNG,
        Some("gif") => mime::IMAGE_GIF,
        Some("bmp") => mime::IMAGE_BMP,
        Some("svg") => mime::IMAGE_SVG,
        Some("webp") => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
