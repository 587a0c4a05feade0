//! Multipart form staging
//!
//! File parts are written into the configured temp directory before any
//! service sees them. Whatever is still staged when the form is dropped is
//! removed, so an aborted request leaves nothing behind.

use actix_multipart::Multipart;
use futures::TryStreamExt;
use log::{debug, warn};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::ApiError;
use crate::model::ObjectId;

/// Text parts are small form fields; anything bigger is a client error
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

#[derive(Debug, Default)]
pub struct StagedForm {
    fields: HashMap<String, String>,
    files: HashMap<String, PathBuf>,
}

impl StagedForm {
    /// Drain `payload`, keeping text parts in memory and writing file parts
    /// under `temp_dir`; at most `max_bytes` are accepted in total
    pub async fn stage(mut payload: Multipart, temp_dir: &Path, max_bytes: usize) -> Result<Self, ApiError> {
        tokio::fs::create_dir_all(temp_dir).await.map_err(|e| {
            warn!("Cannot create staging directory {}: {}", temp_dir.display(), e);
            ApiError::internal("Failed to stage upload")
        })?;

        let mut form = StagedForm::default();
        let mut received = 0usize;

        while let Some(mut field) = payload.try_next().await.map_err(|e| ApiError::validation(e.to_string()))? {
            let disposition = field.content_disposition();
            let name = disposition.get_name().unwrap_or_default().to_string();
            let filename = disposition.get_filename().map(str::to_string);

            match filename {
                Some(filename) => {
                    let path = temp_dir.join(format!("{}-{}", ObjectId::new(), sanitize_filename(&filename)));
                    // Registered before writing so a failed write is still cleaned up
                    if let Some(previous) = form.files.insert(name.clone(), path.clone()) {
                        remove_quietly(&previous);
                    }

                    let mut file = tokio::fs::File::create(&path).await.map_err(staging_failed)?;
                    while let Some(chunk) = field.try_next().await.map_err(|e| ApiError::validation(e.to_string()))? {
                        received += chunk.len();
                        if received > max_bytes {
                            return Err(ApiError::validation("Upload is too large"));
                        }
                        file.write_all(&chunk).await.map_err(staging_failed)?;
                    }
                    file.flush().await.map_err(staging_failed)?;
                    debug!("Staged form file {} at {}", name, path.display());
                }
                None => {
                    let mut value = Vec::new();
                    while let Some(chunk) = field.try_next().await.map_err(|e| ApiError::validation(e.to_string()))? {
                        received += chunk.len();
                        if value.len() + chunk.len() > MAX_TEXT_FIELD_BYTES || received > max_bytes {
                            return Err(ApiError::validation(format!("Field {} is too large", name)));
                        }
                        value.extend_from_slice(&chunk);
                    }
                    let value = String::from_utf8(value)
                        .map_err(|_| ApiError::validation(format!("Field {} is not valid UTF-8", name)))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn file(&self, name: &str) -> Option<&Path> {
        self.files.get(name).map(PathBuf::as_path)
    }
}

impl Drop for StagedForm {
    fn drop(&mut self) {
        for path in self.files.values() {
            remove_quietly(path);
        }
    }
}

fn staging_failed(e: std::io::Error) -> ApiError {
    warn!("Failed to stage upload: {}", e);
    ApiError::internal("Failed to stage upload")
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed staged file {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove staged file {}: {}", path.display(), e),
    }
}

/// Final path component of a client supplied name, restricted to safe characters
fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
