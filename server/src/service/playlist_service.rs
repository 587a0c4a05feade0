//! User playlists of videos

use log::{debug, info};
use std::sync::Arc;

use crate::error::ApiError;
use crate::model::{ObjectId, Playlist, PlaylistPatch, Video};
use crate::service::ensure_owner;
use crate::service::user_context::UserContext;
use crate::store::repository::Repository;
use crate::store::{DocumentStore, Filter};
use crate::validation::{require_id, require_text};

pub struct PlaylistService {
    playlists: Repository<Playlist>,
    videos: Repository<Video>,
}

impl PlaylistService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            playlists: Repository::new(Arc::clone(&store)),
            videos: Repository::new(store),
        }
    }

    fn find_playlist(&self, id: &ObjectId) -> Result<Playlist, ApiError> {
        self.playlists
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("Playlist does not exist"))
    }

    pub fn create_playlist(
        &self,
        user: &UserContext,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Playlist, ApiError> {
        let name = require_text(name, "Name")?;
        let description = require_text(description, "Description")?;

        let playlist = self.playlists.create(Playlist::new(user.user_id, name, description))?;
        info!("User {} created playlist {}", user.user_id, playlist.id);
        Ok(playlist)
    }

    pub fn user_playlists(&self, raw_user_id: &str) -> Result<Vec<Playlist>, ApiError> {
        let owner = require_id(raw_user_id, "user")?;
        Ok(self.playlists.find(&Filter::new().eq("owner", owner))?)
    }

    pub fn get_playlist(&self, raw_id: &str) -> Result<Playlist, ApiError> {
        let id = require_id(raw_id, "playlist")?;
        self.find_playlist(&id)
    }

    /// Adding a video that is already present leaves the playlist unchanged
    pub fn add_video(&self, user: &UserContext, raw_playlist_id: &str, raw_video_id: &str) -> Result<Playlist, ApiError> {
        let playlist_id = require_id(raw_playlist_id, "playlist")?;
        let video_id = require_id(raw_video_id, "video")?;

        let playlist = self.find_playlist(&playlist_id)?;
        ensure_owner(user, &playlist.owner, "playlist")?;
        if !self.videos.exists(&video_id)? {
            return Err(ApiError::not_found("Video does not exist"));
        }

        self.playlists
            .update_with(&playlist_id, |playlist| {
                if playlist.contains(&video_id) {
                    debug!("Video {} already in playlist {}", video_id, playlist_id);
                    return false;
                }
                playlist.videos.push(video_id);
                true
            })?
            .ok_or_else(|| ApiError::not_found("Playlist does not exist"))
    }

    pub fn remove_video(
        &self,
        user: &UserContext,
        raw_playlist_id: &str,
        raw_video_id: &str,
    ) -> Result<Playlist, ApiError> {
        let playlist_id = require_id(raw_playlist_id, "playlist")?;
        let video_id = require_id(raw_video_id, "video")?;

        let playlist = self.find_playlist(&playlist_id)?;
        ensure_owner(user, &playlist.owner, "playlist")?;

        let mut removed = false;
        let updated = self
            .playlists
            .update_with(&playlist_id, |playlist| {
                let before = playlist.videos.len();
                playlist.videos.retain(|v| *v != video_id);
                removed = playlist.videos.len() != before;
                removed
            })?
            .ok_or_else(|| ApiError::not_found("Playlist does not exist"))?;
        if !removed {
            return Err(ApiError::not_found("Video is not in the playlist"));
        }
        Ok(updated)
    }

    pub fn update_playlist(
        &self,
        user: &UserContext,
        raw_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Playlist, ApiError> {
        let id = require_id(raw_id, "playlist")?;
        let name = require_text(name, "Name")?;
        let description = require_text(description, "Description")?;

        let playlist = self.find_playlist(&id)?;
        ensure_owner(user, &playlist.owner, "playlist")?;

        let patch = PlaylistPatch {
            name: Some(name),
            description: Some(description),
            ..Default::default()
        };
        self.playlists
            .update_by_id(&id, &patch)?
            .ok_or_else(|| ApiError::not_found("Playlist does not exist"))
    }

    pub fn delete_playlist(&self, user: &UserContext, raw_id: &str) -> Result<Playlist, ApiError> {
        let id = require_id(raw_id, "playlist")?;
        let playlist = self.find_playlist(&id)?;
        ensure_owner(user, &playlist.owner, "playlist")?;

        let deleted = self
            .playlists
            .delete_by_id(&id)?
            .ok_or_else(|| ApiError::not_found("Playlist does not exist"))?;
        info!("User {} deleted playlist {}", user.user_id, id);
        Ok(deleted)
    }
}
