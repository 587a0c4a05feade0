use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Collection, Entity, ObjectId};

/// A published video and its hosted media
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub owner: ObjectId,
    /// Hosted URL of the video file
    pub video_file: String,
    /// Hosted URL of the thumbnail image
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    /// Length in whole seconds
    pub duration: u64,
    pub views: u64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn new(
        owner: ObjectId,
        title: String,
        description: String,
        video_file: String,
        thumbnail: String,
        duration: u64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            owner,
            video_file,
            thumbnail,
            title,
            description,
            duration,
            views: 0,
            is_published: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Video {
    const COLLECTION: Collection = Collection::Videos;

    fn id(&self) -> ObjectId {
        self.id
    }

    fn owner(&self) -> ObjectId {
        self.owner
    }
}

/// Partial update of a video; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}
