//! Comments on videos

use log::info;
use std::sync::Arc;

use crate::error::ApiError;
use crate::model::{Comment, ContentPatch, ObjectId, Video};
use crate::response::Page;
use crate::service::user_context::UserContext;
use crate::service::{ensure_owner, resolve_page};
use crate::store::repository::Repository;
use crate::store::{DocumentStore, Filter};
use crate::validation::{require_id, require_text};

pub struct CommentService {
    comments: Repository<Comment>,
    videos: Repository<Video>,
}

impl CommentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            comments: Repository::new(Arc::clone(&store)),
            videos: Repository::new(store),
        }
    }

    fn ensure_video_exists(&self, id: &ObjectId) -> Result<(), ApiError> {
        if !self.videos.exists(id)? {
            return Err(ApiError::not_found("Video does not exist"));
        }
        Ok(())
    }

    fn find_comment(&self, id: &ObjectId) -> Result<Comment, ApiError> {
        self.comments
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("Comment does not exist"))
    }

    /// Comments on a video, oldest first
    pub fn list_video_comments(
        &self,
        raw_video_id: &str,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> Result<Page<Comment>, ApiError> {
        let video_id = require_id(raw_video_id, "video")?;
        let (page, limit) = resolve_page(page, limit)?;
        self.ensure_video_exists(&video_id)?;

        let comments = self.comments.find(&Filter::new().eq("video", video_id))?;
        Ok(Page::paginate(comments, page, limit))
    }

    pub fn add_comment(&self, user: &UserContext, raw_video_id: &str, content: Option<&str>) -> Result<Comment, ApiError> {
        let video_id = require_id(raw_video_id, "video")?;
        let content = require_text(content, "Content")?;
        self.ensure_video_exists(&video_id)?;

        let comment = self.comments.create(Comment::new(user.user_id, video_id, content))?;
        info!("User {} commented {} on video {}", user.user_id, comment.id, video_id);
        Ok(comment)
    }

    pub fn update_comment(
        &self,
        user: &UserContext,
        raw_comment_id: &str,
        content: Option<&str>,
    ) -> Result<Comment, ApiError> {
        let id = require_id(raw_comment_id, "comment")?;
        let content = require_text(content, "Content")?;

        let comment = self.find_comment(&id)?;
        ensure_owner(user, &comment.owner, "comment")?;

        self.comments
            .update_by_id(&id, &ContentPatch { content })?
            .ok_or_else(|| ApiError::not_found("Comment does not exist"))
    }

    pub fn delete_comment(&self, user: &UserContext, raw_comment_id: &str) -> Result<Comment, ApiError> {
        let id = require_id(raw_comment_id, "comment")?;
        let comment = self.find_comment(&id)?;
        ensure_owner(user, &comment.owner, "comment")?;

        let deleted = self
            .comments
            .delete_by_id(&id)?
            .ok_or_else(|| ApiError::not_found("Comment does not exist"))?;
        info!("User {} deleted comment {}", user.user_id, id);
        Ok(deleted)
    }
}
