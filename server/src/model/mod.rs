//! Persisted entities
//!
//! Every entity is stored as an independent document keyed by an
//! [`ObjectId`] and owned by the user that created it.

pub mod object_id;
pub mod video;
pub mod social;
pub mod like;
pub mod playlist;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use like::{Like, LikeTarget, TargetKind};
pub use object_id::ObjectId;
pub use playlist::{Playlist, PlaylistPatch};
pub use social::{Comment, ContentPatch, Tweet};
pub use video::{Video, VideoPatch};

/// Named collections in the document store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Videos,
    Comments,
    Likes,
    Tweets,
    Playlists,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Videos,
        Collection::Comments,
        Collection::Likes,
        Collection::Tweets,
        Collection::Playlists,
    ];

    /// Table / map name used by the store backends
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Videos => "videos",
            Collection::Comments => "comments",
            Collection::Likes => "likes",
            Collection::Tweets => "tweets",
            Collection::Playlists => "playlists",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A type that can be persisted in the document store
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> ObjectId;

    /// User that created the entity
    fn owner(&self) -> ObjectId;

    /// Key that must be unique across the collection, if any
    fn unique_key(&self) -> Option<String> {
        None
    }
}
