//! Mock implementation of MediaRelay for testing

use crate::media::{MediaError, MediaRelay, ResourceKind, UploadedMedia};
use crate::model::ObjectId;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

const MOCK_URL_PREFIX: &str = "https://media.mock";

#[derive(Debug, Clone)]
struct MockObject {
    kind: ResourceKind,
    data: Bytes,
}

/// Keeps uploaded media in memory and can be told to fail
pub struct MockMediaRelay {
    objects: Arc<Mutex<HashMap<String, MockObject>>>,
    video_duration: Option<f64>,
    fail_uploads: bool,
    failing_destroy_kinds: Vec<ResourceKind>,
}

impl MockMediaRelay {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            video_duration: Some(12.4),
            fail_uploads: false,
            failing_destroy_kinds: Vec::new(),
        }
    }

    /// Duration reported for uploaded videos
    pub fn with_video_duration(mut self, duration: Option<f64>) -> Self {
        self.video_duration = duration;
        self
    }

    pub fn failing_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    pub fn failing_destroys(mut self) -> Self {
        self.failing_destroy_kinds = vec![ResourceKind::Image, ResourceKind::Video, ResourceKind::Raw];
        self
    }

    /// Fail destroys of one resource kind only
    pub fn failing_destroys_of(mut self, kind: ResourceKind) -> Self {
        self.failing_destroy_kinds.push(kind);
        self
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn contains(&self, public_id: &str) -> bool {
        self.objects.lock().map(|objects| objects.contains_key(public_id)).unwrap_or(false)
    }

    /// Stored bytes of an object, if present
    pub fn data(&self, public_id: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(public_id).map(|o| o.data.clone()))
    }
}

impl Default for MockMediaRelay {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> MediaError {
    MediaError::Rejected("mock media relay lock poisoned".to_string())
}

#[async_trait]
impl MediaRelay for MockMediaRelay {
    async fn upload(&self, local_file: &Path) -> Result<UploadedMedia, MediaError> {
        let data = match tokio::fs::read(local_file).await {
            Ok(data) => Bytes::from(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MediaError::MissingFile(local_file.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        if self.fail_uploads {
            return Err(MediaError::Rejected("mock upload failure".to_string()));
        }

        let kind = ResourceKind::from_path(local_file);
        let public_id = ObjectId::new().to_string();
        let extension = local_file.extension().and_then(|e| e.to_str()).unwrap_or("bin");
        let url = format!("{}/{}/upload/{}.{}", MOCK_URL_PREFIX, kind, public_id, extension);

        self.objects
            .lock()
            .map_err(|_| poisoned())?
            .insert(public_id.clone(), MockObject { kind, data });

        Ok(UploadedMedia {
            url,
            public_id,
            kind,
            duration_seconds: if kind == ResourceKind::Video { self.video_duration } else { None },
        })
    }

    async fn destroy(&self, public_id: &str, kind: ResourceKind) -> Result<(), MediaError> {
        if self.failing_destroy_kinds.contains(&kind) {
            return Err(MediaError::Rejected("mock destroy failure".to_string()));
        }
        let mut objects = self.objects.lock().map_err(|_| poisoned())?;
        if let Some(existing) = objects.get(public_id) {
            if existing.kind != kind && kind != ResourceKind::Raw {
                return Err(MediaError::Rejected(format!(
                    "{} is a {}, not a {}",
                    public_id, existing.kind, kind
                )));
            }
            objects.remove(public_id);
        }
        Ok(())
    }
}
