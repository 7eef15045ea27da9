use crate::api::error::AppError;
use crate::utils::validation::{
    file_extension, is_allowed_image_mime, safe_file_name, validate_image_mime,
};
use futures::future::join_all;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use utoipa::ToSchema;
use uuid::Uuid;

/// URL area for files awaiting promotion
pub const TEMP_AREA: &str = "temp-uploads";
/// URL area for files owned by a committed product
pub const PERMANENT_AREA: &str = "uploads";

/// Filesystem-backed image storage with a temporary staging area.
///
/// Uploaded files land in the temp directory under a fresh UUID name and
/// stay orphaned until a product claims them (promotion) or an abandoned
/// form discards them (cleanup). A client that disconnects without doing
/// either leaves the temp file behind; there is no background reaper.
pub struct UploadStorage {
    temp_dir: PathBuf,
    permanent_dir: PathBuf,
    max_upload_size: usize,
}

/// Result of staging an upload: the temp-area reference path plus the
/// generated on-disk filename.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub path: String,
    pub filename: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CleanupOutcome {
    pub path: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl UploadStorage {
    pub fn new(temp_dir: PathBuf, permanent_dir: PathBuf, max_upload_size: usize) -> Self {
        Self {
            temp_dir,
            permanent_dir,
            max_upload_size,
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn permanent_dir(&self) -> &Path {
        &self.permanent_dir
    }

    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.temp_dir).await?;
        fs::create_dir_all(&self.permanent_dir).await
    }

    /// Validates and writes an uploaded image into the temp area.
    ///
    /// The filename is `<uuid>.<ext>` with the extension derived from the
    /// original name, so concurrent uploads never collide.
    pub async fn stage(
        &self,
        original_filename: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<StagedUpload, AppError> {
        let declared = content_type
            .ok_or_else(|| AppError::BadRequest("Missing file content type".to_string()))?;

        validate_image_mime(declared).map_err(|e| AppError::UnsupportedMediaType(e.to_string()))?;

        if data.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }

        if data.len() > self.max_upload_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File size {} bytes exceeds maximum allowed {} bytes",
                data.len(),
                self.max_upload_size
            )));
        }

        // A payload whose magic bytes identify it as something other than an
        // allowed image is rejected even when the declared type passes.
        // Unrecognized content is let through; not every valid image variant
        // carries a known signature.
        if let Some(kind) = infer::get(data) {
            if !is_allowed_image_mime(kind.mime_type()) {
                return Err(AppError::UnsupportedMediaType(format!(
                    "File content detected as '{}'",
                    kind.mime_type()
                )));
            }
        }

        let filename = format!("{}.{}", Uuid::new_v4(), file_extension(original_filename));

        fs::create_dir_all(&self.temp_dir).await?;
        fs::write(self.temp_dir.join(&filename), data).await?;

        Ok(StagedUpload {
            path: format!("/{}/{}", TEMP_AREA, filename),
            filename,
        })
    }

    /// Moves a staged file into the permanent area and returns its new
    /// reference path.
    ///
    /// Copy-then-delete: a crash between the two steps leaves a temp orphan
    /// behind but never a partially promoted reference. Not idempotent; a
    /// second promotion of the same path fails with `NotFound`.
    pub async fn promote(&self, temp_path: &str) -> Result<String, AppError> {
        let name = safe_file_name(temp_path).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let source = self.temp_dir.join(name);

        match fs::metadata(&source).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::NotFound(format!(
                    "Staged file '{}' not found",
                    name
                )));
            }
            Err(e) => return Err(AppError::Storage(e)),
        }

        fs::create_dir_all(&self.permanent_dir).await?;

        fs::copy(&source, self.permanent_dir.join(name)).await?;
        fs::remove_file(&source).await?;

        Ok(format!("/{}/{}", PERMANENT_AREA, name))
    }

    /// Deletes a batch of temp-area references, one outcome per path.
    ///
    /// Deletions run concurrently; a missing file records a `not found`
    /// outcome and never fails the batch.
    pub async fn cleanup(&self, paths: &[String]) -> Vec<CleanupOutcome> {
        join_all(paths.iter().map(|path| self.cleanup_one(path))).await
    }

    async fn cleanup_one(&self, path: &str) -> CleanupOutcome {
        // Abandoned forms routinely submit empty slots; treat them as done.
        if path.trim().is_empty() {
            return CleanupOutcome {
                path: path.to_string(),
                success: true,
                reason: None,
            };
        }

        let name = match safe_file_name(path) {
            Ok(name) => name,
            Err(e) => {
                return CleanupOutcome {
                    path: path.to_string(),
                    success: false,
                    reason: Some(e.to_string()),
                };
            }
        };

        match fs::remove_file(self.temp_dir.join(name)).await {
            Ok(()) => CleanupOutcome {
                path: path.to_string(),
                success: true,
                reason: None,
            },
            Err(e) if e.kind() == ErrorKind::NotFound => CleanupOutcome {
                path: path.to_string(),
                success: false,
                reason: Some("not found".to_string()),
            },
            Err(e) => {
                tracing::warn!("Failed to delete temp file {}: {}", name, e);
                CleanupOutcome {
                    path: path.to_string(),
                    success: false,
                    reason: Some(e.to_string()),
                }
            }
        }
    }

    /// Removes a permanent-area file. Missing files are fine; this runs on
    /// the rollback path after a failed product insert.
    pub async fn remove_permanent(&self, path: &str) -> Result<(), AppError> {
        let name = safe_file_name(path).map_err(|e| AppError::BadRequest(e.to_string()))?;

        match fs::remove_file(self.permanent_dir.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_areas_are_distinct() {
        assert_ne!(TEMP_AREA, PERMANENT_AREA);
    }
}
