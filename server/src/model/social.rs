//! Text entities: comments on videos and standalone tweets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Collection, Entity, ObjectId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub owner: ObjectId,
    /// Video the comment was posted on
    pub video: ObjectId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(owner: ObjectId, video: ObjectId, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            owner,
            video,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Comment {
    const COLLECTION: Collection = Collection::Comments;

    fn id(&self) -> ObjectId {
        self.id
    }

    fn owner(&self) -> ObjectId {
        self.owner
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub owner: ObjectId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tweet {
    pub fn new(owner: ObjectId, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            owner,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Tweet {
    const COLLECTION: Collection = Collection::Tweets;

    fn id(&self) -> ObjectId {
        self.id
    }

    fn owner(&self) -> ObjectId {
        self.owner
    }
}

/// Content replacement shared by comments and tweets
#[derive(Debug, Clone, Serialize)]
pub struct ContentPatch {
    pub content: String,
}
