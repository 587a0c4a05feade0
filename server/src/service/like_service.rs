//! Like toggling for videos, comments and tweets

use log::{debug, info};
use std::sync::Arc;

use crate::error::ApiError;
use crate::model::{Comment, Like, LikeTarget, ObjectId, TargetKind, Tweet, Video};
use crate::service::user_context::UserContext;
use crate::store::repository::Repository;
use crate::store::{DocumentStore, Filter, Toggled};
use crate::validation::require_id;

pub struct LikeService {
    likes: Repository<Like>,
    videos: Repository<Video>,
    comments: Repository<Comment>,
    tweets: Repository<Tweet>,
}

impl LikeService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            likes: Repository::new(Arc::clone(&store)),
            videos: Repository::new(Arc::clone(&store)),
            comments: Repository::new(Arc::clone(&store)),
            tweets: Repository::new(store),
        }
    }

    fn target_exists(&self, kind: TargetKind, id: &ObjectId) -> Result<bool, ApiError> {
        let exists = match kind {
            TargetKind::Video => self.videos.exists(id)?,
            TargetKind::Comment => self.comments.exists(id)?,
            TargetKind::Tweet => self.tweets.exists(id)?,
        };
        Ok(exists)
    }

    /// Like the target if `user` has not liked it yet, otherwise unlike it
    pub fn toggle_like(&self, user: &UserContext, kind: TargetKind, raw_id: &str) -> Result<Toggled<Like>, ApiError> {
        let target_id = require_id(raw_id, kind.as_str())?;
        if !self.target_exists(kind, &target_id)? {
            return Err(ApiError::not_found(format!("{} does not exist", capitalized(kind))));
        }

        let like = Like::new(user.user_id, LikeTarget { kind, id: target_id });
        let outcome = self.likes.toggle(like)?;
        info!(
            "User {} {} like on {} {}",
            user.user_id,
            if outcome.is_added() { "added" } else { "removed" },
            kind,
            target_id
        );
        Ok(outcome)
    }

    /// Videos `user` has liked, in the order they were liked
    pub fn liked_videos(&self, user: &UserContext) -> Result<Vec<Video>, ApiError> {
        let filter = Filter::new()
            .eq("likedBy", user.user_id)
            .eq("target.kind", TargetKind::Video.as_str());

        let mut videos = Vec::new();
        for like in self.likes.find(&filter)? {
            match self.videos.find_by_id(&like.target.id)? {
                Some(video) if video.is_published || user.owns(&video.owner) => videos.push(video),
                Some(_) => {}
                None => debug!("Skipping like {} on deleted video {}", like.id, like.target.id),
            }
        }
        Ok(videos)
    }
}

fn capitalized(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Video => "Video",
        TargetKind::Comment => "Comment",
        TargetKind::Tweet => "Tweet",
    }
}
