//! Media Relay Abstraction
//!
//! Binary media (video files, thumbnails) is not kept by this server. It is
//! handed to a hosting backend which returns a stable public URL. Backends:
//! Cloudinary for production, a local directory for development and an
//! in-memory mock for tests.

pub mod cloudinary;
pub mod local_store;
pub mod mock_store;


use async_trait::async_trait;
use mime_guess::{mime, MimeGuess};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("local file {0} does not exist")]
    MissingFile(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("media service request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("media service rejected the request: {0}")]
    Rejected(String),
    #[error("cannot derive a media id from {0:?}")]
    InvalidUrl(String),
}

/// Resource type understood by the hosting service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Video,
    Raw,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Video => "video",
            ResourceKind::Raw => "raw",
        }
    }

    /// Guess the kind from the file's MIME type; audio is hosted as video
    pub fn from_path(path: &Path) -> Self {
        match MimeGuess::from_path(path).first() {
            Some(mime) if mime.type_() == mime::IMAGE => ResourceKind::Image,
            Some(mime) if mime.type_() == mime::VIDEO || mime.type_() == mime::AUDIO => ResourceKind::Video,
            _ => ResourceKind::Raw,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the hosting service reports back after an upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
    pub kind: ResourceKind,
    /// Only reported for audio/video
    pub duration_seconds: Option<f64>,
}

/// Trait defining the media hosting interface
#[async_trait]
pub trait MediaRelay: Send + Sync {
    /// Send a local file to the hosting service; the caller owns the local file
    async fn upload(&self, local_file: &Path) -> Result<UploadedMedia, MediaError>;

    /// Remove a hosted object; an object that is already gone is not an error
    async fn destroy(&self, public_id: &str, kind: ResourceKind) -> Result<(), MediaError>;
}

/// Public id of a hosted object: the last URL segment without its extension
pub fn public_id_from_url(url: &str) -> Result<String, MediaError> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let id = last.split('.').next().unwrap_or_default();
    if id.is_empty() {
        return Err(MediaError::InvalidUrl(url.to_string()));
    }
    Ok(id.to_string())
}
