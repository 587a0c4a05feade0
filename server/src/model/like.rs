//! Engagement records
//!
//! A like points at exactly one target. The pair (liking user, target) is
//! unique across the collection, which the store enforces through
//! [`Entity::unique_key`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Collection, Entity, ObjectId};

/// Kind of entity a like can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Video,
    Comment,
    Tweet,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Video => "video",
            TargetKind::Comment => "comment",
            TargetKind::Tweet => "tweet",
        }
    }

    /// Collection holding entities of this kind
    pub fn collection(&self) -> Collection {
        match self {
            TargetKind::Video => Collection::Videos,
            TargetKind::Comment => Collection::Comments,
            TargetKind::Tweet => Collection::Tweets,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LikeTarget {
    pub kind: TargetKind,
    pub id: ObjectId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub liked_by: ObjectId,
    pub target: LikeTarget,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Like {
    pub fn new(liked_by: ObjectId, target: LikeTarget) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            liked_by,
            target,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Like {
    const COLLECTION: Collection = Collection::Likes;

    fn id(&self) -> ObjectId {
        self.id
    }

    fn owner(&self) -> ObjectId {
        self.liked_by
    }

    fn unique_key(&self) -> Option<String> {
        Some(format!("{}:{}:{}", self.liked_by, self.target.kind, self.target.id))
    }
}
