//! Local directory implementation of MediaRelay
//!
//! Copies media into a directory and hands out URLs under a configured
//! public prefix. The server itself serves that directory at `/media/{file}`.

use crate::config::MediaConfig;
use crate::media::{MediaError, MediaRelay, ResourceKind, UploadedMedia};
use crate::model::ObjectId;
use async_trait::async_trait;
use log::{info, warn};
use std::path::{Path, PathBuf};

pub struct LocalMediaStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalMediaStore {
    pub fn new(config: &MediaConfig) -> Result<Self, MediaError> {
        let base_path = PathBuf::from(&config.base_path);
        if !base_path.exists() {
            std::fs::create_dir_all(&base_path)?;
        }
        info!("Using local media directory: {}", base_path.display());
        Ok(Self {
            base_path,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Stored file whose name (minus extension) is `public_id`
    async fn locate(&self, public_id: &str) -> Result<Option<PathBuf>, MediaError> {
        let mut entries = tokio::fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.file_stem().and_then(|s| s.to_str()) == Some(public_id) {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl MediaRelay for LocalMediaStore {
    async fn upload(&self, local_file: &Path) -> Result<UploadedMedia, MediaError> {
        if !tokio::fs::try_exists(local_file).await.unwrap_or(false) {
            return Err(MediaError::MissingFile(local_file.to_path_buf()));
        }

        let public_id = ObjectId::new().to_string();
        let file_name = match local_file.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", public_id, ext.to_ascii_lowercase()),
            None => public_id.clone(),
        };
        tokio::fs::copy(local_file, self.base_path.join(&file_name)).await?;

        info!("Stored {} as {}", local_file.display(), file_name);
        Ok(UploadedMedia {
            url: format!("{}/{}", self.public_base_url, file_name),
            public_id,
            kind: ResourceKind::from_path(local_file),
            duration_seconds: None,
        })
    }

    async fn destroy(&self, public_id: &str, kind: ResourceKind) -> Result<(), MediaError> {
        match self.locate(public_id).await? {
            Some(path) => {
                tokio::fs::remove_file(&path).await?;
                info!("Removed local {} {}", kind, path.display());
            }
            None => warn!("Local {} {} was already gone", kind, public_id),
        }
        Ok(())
    }
}
