use std::path::{Path, PathBuf};

use cookbook_shared::constants::{PHOTO_EXTENSIONS, UPLOADS_ROUTE};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ServerError;

/// Verify that a resolved path stays within the expected base directory.
/// Prevents path traversal attacks.
fn ensure_within(base: &Path, file_name: &str) -> Result<PathBuf, ServerError> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(name)), None) => Ok(base.join(name)),
        _ => Err(ServerError::Validation("Invalid photo name".to_string())),
    }
}

/// Pick the stored extension from the uploaded file name, falling back to
/// the declared content type.
fn photo_extension(
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<&'static str, ServerError> {
    let from_name = file_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    if let Some(ext) = from_name {
        if let Some(known) = PHOTO_EXTENSIONS.iter().find(|k| **k == ext) {
            return Ok(*known);
        }
    }

    match content_type {
        Some("image/jpeg") => Ok("jpg"),
        Some("image/png") => Ok("png"),
        Some("image/webp") => Ok("webp"),
        Some("image/gif") => Ok("gif"),
        _ => Err(ServerError::Validation(format!(
            "Unsupported photo type (allowed: {})",
            PHOTO_EXTENSIONS.join(", ")
        ))),
    }
}

/// Recipe photos on local disk, served back under [`UPLOADS_ROUTE`].
#[derive(Debug, Clone)]
pub struct PhotoStore {
    base_path: PathBuf,
    max_size: usize,
}

impl PhotoStore {
    pub async fn new(base_path: PathBuf, max_size: usize) -> Result<Self, ServerError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ServerError::Internal(format!(
                "Failed to create upload directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Photo store initialized");

        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Write a photo under a fresh name and return that name.
    pub async fn store_photo(
        &self,
        data: &[u8],
        file_name: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<String, ServerError> {
        if data.is_empty() {
            return Err(ServerError::Validation("Empty photo".to_string()));
        }
        if data.len() > self.max_size {
            return Err(ServerError::Validation(format!(
                "Photo too large: {} bytes (max {})",
                data.len(),
                self.max_size
            )));
        }

        let ext = photo_extension(file_name, content_type)?;
        let name = format!("{}.{}", Uuid::new_v4(), ext);
        let path = ensure_within(&self.base_path, &name)?;

        fs::write(&path, data)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to write photo {}: {}", name, e)))?;

        debug!(name = %name, size = data.len(), "Stored photo");
        Ok(name)
    }

    /// Remove a photo written by [`store_photo`](Self::store_photo).
    /// Missing files are not an error.
    pub async fn delete_photo(&self, name: &str) -> Result<(), ServerError> {
        let path = ensure_within(&self.base_path, name)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(name = %name, "Deleted photo");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(name = %name, "Photo already gone");
                Ok(())
            }
            Err(e) => Err(ServerError::Internal(format!(
                "Failed to delete photo {}: {}",
                name, e
            ))),
        }
    }

    /// Public URL of a stored photo.
    pub fn url_for(name: &str) -> String {
        format!("{UPLOADS_ROUTE}/{name}")
    }
}
