use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Collection, Entity, ObjectId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub owner: ObjectId,
    pub name: String,
    pub description: String,
    /// Videos in insertion order, without duplicates
    pub videos: Vec<ObjectId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    pub fn new(owner: ObjectId, name: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            owner,
            name,
            description,
            videos: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn contains(&self, video: &ObjectId) -> bool {
        self.videos.contains(video)
    }
}

impl Entity for Playlist {
    const COLLECTION: Collection = Collection::Playlists;

    fn id(&self) -> ObjectId {
        self.id
    }

    fn owner(&self) -> ObjectId {
        self.owner
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlaylistPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<ObjectId>>,
}
