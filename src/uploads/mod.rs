//! Image upload storage.
//!
//! Uploaded images land in a single directory under a generated name and are
//! referenced from events by their public path.

use std::path::PathBuf;

use crate::errors::AppError;
use crate::store::{FsStorage, Storage};

/// Public URL prefix the uploads directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Image types accepted for upload.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Writes validated images into the uploads directory.
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
    storage: FsStorage,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
            storage: FsStorage,
        }
    }

    /// Check type and size before anything touches the disk.
    pub fn validate(&self, content_type: Option<&str>, size: usize) -> Result<(), AppError> {
        match content_type {
            Some(ct) if ALLOWED_CONTENT_TYPES.contains(&ct) => {}
            _ => {
                return Err(AppError::Validation(
                    "Invalid file type. Only JPEG, PNG, WebP, and GIF are allowed.".to_string(),
                ))
            }
        }
        if size > self.max_bytes {
            return Err(AppError::Validation(format!(
                "File size exceeds the {}MB limit.",
                self.max_bytes / (1024 * 1024)
            )));
        }
        Ok(())
    }

    /// Save an image and return its public path, e.g. `/uploads/<uuid>.png`.
    pub async fn save(
        &self,
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, AppError> {
        self.validate(content_type, bytes.len())?;

        self.storage
            .make_directories(&self.dir)
            .await
            .map_err(|e| {
                AppError::StorageUnavailable(format!(
                    "Failed to create uploads directory {}: {}",
                    self.dir.display(),
                    e
                ))
            })?;

        let extension = extension_for(file_name, content_type.unwrap_or_default());
        let stored_name = format!("{}.{}", uuid::Uuid::new_v4(), extension);

        self.storage
            .write_all(&self.dir.join(&stored_name), bytes)
            .await
            .map_err(|e| {
                tracing::error!("Failed to save image file {}: {}", stored_name, e);
                AppError::Persistence(format!("Failed to save image file: {}", e))
            })?;

        tracing::info!(file = %stored_name, size = bytes.len(), "Stored uploaded image");
        Ok(format!("{}/{}", PUBLIC_PREFIX, stored_name))
    }

    /// Delete a previously saved image by its public path.
    ///
    /// Paths outside the uploads directory are ignored. Failures are logged,
    /// not returned.
    pub async fn remove(&self, public_path: &str) {
        let Some(name) = stored_name(public_path) else {
            tracing::warn!(path = %public_path, "Refusing to remove path outside uploads");
            return;
        };

        match self.storage.remove(&self.dir.join(name)).await {
            Ok(()) => tracing::info!(file = %name, "Removed uploaded image"),
            Err(e) => tracing::warn!("Failed to remove image file {}: {}", name, e),
        }
    }
}

/// File name part of `/uploads/<name>`, if it names a file directly inside
/// the uploads directory.
fn stored_name(public_path: &str) -> Option<&str> {
    let name = public_path.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\']);
    plain.then_some(name)
}

/// Extension from the client file name, or from the content type when the
/// name has none usable.
fn extension_for(file_name: Option<&str>, content_type: &str) -> String {
    let from_name = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.unwrap_or_else(|| {
        match content_type {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
        .to_string()
    })
}
