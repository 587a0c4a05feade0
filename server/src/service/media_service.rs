//! Moves staged uploads to the media relay and removes hosted media

use log::{debug, warn};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use crate::media::{public_id_from_url, MediaError, MediaRelay, ResourceKind, UploadedMedia};

pub struct MediaService {
    relay: Arc<dyn MediaRelay>,
}

impl MediaService {
    pub fn new(relay: Arc<dyn MediaRelay>) -> Self {
        Self { relay }
    }

    /// Upload a staged file. The staged copy is gone afterwards whether the
    /// upload succeeded or not.
    pub async fn upload(&self, staged: &Path) -> Result<UploadedMedia, MediaError> {
        if tokio::fs::metadata(staged).await.is_err() {
            return Err(MediaError::MissingFile(staged.to_path_buf()));
        }

        let result = self.relay.upload(staged).await;
        remove_staged(staged).await;

        if let Ok(uploaded) = &result {
            debug!("Uploaded {} as {} ({})", staged.display(), uploaded.public_id, uploaded.kind);
        }
        result
    }

    /// Remove the hosted object behind `url`
    pub async fn delete(&self, url: &str, kind: ResourceKind) -> Result<(), MediaError> {
        let public_id = public_id_from_url(url)?;
        self.relay.destroy(&public_id, kind).await?;
        debug!("Removed hosted {} {}", kind, public_id);
        Ok(())
    }
}

async fn remove_staged(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove staged file {}: {}", path.display(), e),
    }
}
