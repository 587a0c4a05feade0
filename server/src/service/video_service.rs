//! Video publishing, browsing and owner-scoped management

use log::{debug, info, warn};
use serde::Deserialize;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use crate::error::ApiError;
use crate::media::{ResourceKind, UploadedMedia};
use crate::model::{ObjectId, Video, VideoPatch};
use crate::response::Page;
use crate::service::media_service::MediaService;
use crate::service::user_context::UserContext;
use crate::service::{ensure_owner, resolve_page};
use crate::store::repository::Repository;
use crate::store::{DocumentStore, Filter};
use crate::validation::{require_id, require_text};

/// Query string accepted by the video listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
    Duration,
    Views,
}

impl SortField {
    fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        match raw.unwrap_or("createdAt") {
            "createdAt" => Ok(SortField::CreatedAt),
            "updatedAt" => Ok(SortField::UpdatedAt),
            "title" => Ok(SortField::Title),
            "duration" => Ok(SortField::Duration),
            "views" => Ok(SortField::Views),
            other => Err(ApiError::validation(format!("Cannot sort videos by {:?}", other))),
        }
    }

    fn compare(&self, a: &Video, b: &Video) -> Ordering {
        match self {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Duration => a.duration.cmp(&b.duration),
            SortField::Views => a.views.cmp(&b.views),
        }
    }
}

fn descending(sort_type: Option<&str>) -> Result<bool, ApiError> {
    match sort_type.map(str::to_ascii_lowercase).as_deref() {
        None | Some("desc") => Ok(true),
        Some("asc") => Ok(false),
        Some(other) => Err(ApiError::validation(format!("sortType must be asc or desc, got {:?}", other))),
    }
}

fn rounded_duration(uploaded: &UploadedMedia) -> u64 {
    uploaded.duration_seconds.map(|d| d.max(0.0).round() as u64).unwrap_or(0)
}

pub struct VideoService {
    videos: Repository<Video>,
    media: Arc<MediaService>,
}

impl VideoService {
    pub fn new(store: Arc<dyn DocumentStore>, media: Arc<MediaService>) -> Self {
        Self {
            videos: Repository::new(store),
            media,
        }
    }

    fn find_video(&self, id: &ObjectId) -> Result<Video, ApiError> {
        self.videos
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("Video does not exist"))
    }

    /// Best-effort removal of media that no record will point to
    async fn discard(&self, url: &str, kind: ResourceKind) {
        if let Err(e) = self.media.delete(url, kind).await {
            warn!("Leaving orphaned {} at {}: {}", kind, url, e);
        }
    }

    pub fn list_videos(&self, user: &UserContext, query: &VideoQuery) -> Result<Page<Video>, ApiError> {
        let (page, limit) = resolve_page(query.page, query.limit)?;
        let field = SortField::parse(query.sort_by.as_deref())?;
        let descending = descending(query.sort_type.as_deref())?;
        let owner = query
            .user_id
            .as_deref()
            .map(|raw| require_id(raw, "user"))
            .transpose()?;

        let filter = match owner {
            Some(owner) => Filter::new().eq("owner", owner),
            None => Filter::new(),
        };
        // Unpublished videos show up only when a user browses their own channel
        let own_channel = owner.map(|o| user.owns(&o)).unwrap_or(false);
        let needle = query.query.as_deref().map(str::trim).filter(|q| !q.is_empty()).map(str::to_lowercase);

        let mut videos: Vec<Video> = self
            .videos
            .find(&filter)?
            .into_iter()
            .filter(|v| v.is_published || own_channel)
            .filter(|v| match &needle {
                Some(needle) => {
                    v.title.to_lowercase().contains(needle) || v.description.to_lowercase().contains(needle)
                }
                None => true,
            })
            .collect();

        videos.sort_by(|a, b| {
            let ordering = field.compare(a, b);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });

        debug!("Listing {} videos (page {}, limit {})", videos.len(), page, limit);
        Ok(Page::paginate(videos, page, limit))
    }

    pub async fn publish_video(
        &self,
        user: &UserContext,
        title: Option<&str>,
        description: Option<&str>,
        video_file: Option<&Path>,
        thumbnail: Option<&Path>,
    ) -> Result<Video, ApiError> {
        let title = require_text(title, "Title")?;
        let description = require_text(description, "Description")?;
        let video_file = video_file.ok_or_else(|| ApiError::validation("Video file is required"))?;
        let thumbnail = thumbnail.ok_or_else(|| ApiError::validation("Thumbnail is required"))?;

        let uploaded_video = self.media.upload(video_file).await?;
        let uploaded_thumbnail = match self.media.upload(thumbnail).await {
            Ok(uploaded) => uploaded,
            Err(e) => {
                self.discard(&uploaded_video.url, ResourceKind::Video).await;
                return Err(e.into());
            }
        };

        let video = Video::new(
            user.user_id,
            title,
            description,
            uploaded_video.url.clone(),
            uploaded_thumbnail.url.clone(),
            rounded_duration(&uploaded_video),
        );
        match self.videos.create(video) {
            Ok(video) => {
                info!("User {} published video {}", user.user_id, video.id);
                Ok(video)
            }
            Err(e) => {
                self.discard(&uploaded_video.url, ResourceKind::Video).await;
                self.discard(&uploaded_thumbnail.url, ResourceKind::Image).await;
                Err(e.into())
            }
        }
    }

    pub fn get_video(&self, user: &UserContext, raw_id: &str) -> Result<Video, ApiError> {
        let id = require_id(raw_id, "video")?;
        let video = self.find_video(&id)?;
        if !video.is_published && !user.owns(&video.owner) {
            return Err(ApiError::not_found("Video does not exist"));
        }
        Ok(video)
    }

    pub async fn update_video(
        &self,
        user: &UserContext,
        raw_id: &str,
        title: Option<&str>,
        description: Option<&str>,
        thumbnail: Option<&Path>,
    ) -> Result<Video, ApiError> {
        let id = require_id(raw_id, "video")?;
        let title = require_text(title, "Title")?;
        let description = require_text(description, "Description")?;

        let video = self.find_video(&id)?;
        ensure_owner(user, &video.owner, "video")?;

        let new_thumbnail = match thumbnail {
            Some(path) => Some(self.media.upload(path).await?),
            None => None,
        };
        let patch = VideoPatch {
            title: Some(title),
            description: Some(description),
            thumbnail: new_thumbnail.as_ref().map(|t| t.url.clone()),
            ..Default::default()
        };

        let updated = match self.videos.update_by_id(&id, &patch) {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                if let Some(t) = &new_thumbnail {
                    self.discard(&t.url, ResourceKind::Image).await;
                }
                return Err(ApiError::not_found("Video does not exist"));
            }
            Err(e) => {
                if let Some(t) = &new_thumbnail {
                    self.discard(&t.url, ResourceKind::Image).await;
                }
                return Err(e.into());
            }
        };

        if new_thumbnail.is_some() {
            self.discard(&video.thumbnail, ResourceKind::Image).await;
        }
        info!("User {} updated video {}", user.user_id, id);
        Ok(updated)
    }

    /// Remove the hosted media first; the record survives if that fails
    pub async fn delete_video(&self, user: &UserContext, raw_id: &str) -> Result<Video, ApiError> {
        let id = require_id(raw_id, "video")?;
        let video = self.find_video(&id)?;
        ensure_owner(user, &video.owner, "video")?;

        // A kept record must still point at its video file; a thumbnail may be orphaned
        self.media.delete(&video.video_file, ResourceKind::Video).await?;
        let deleted = self
            .videos
            .delete_by_id(&id)?
            .ok_or_else(|| ApiError::not_found("Video does not exist"))?;
        self.discard(&video.thumbnail, ResourceKind::Image).await;
        info!("User {} deleted video {}", user.user_id, id);
        Ok(deleted)
    }

    pub fn toggle_publish_status(&self, user: &UserContext, raw_id: &str) -> Result<Video, ApiError> {
        let id = require_id(raw_id, "video")?;
        let video = self.find_video(&id)?;
        ensure_owner(user, &video.owner, "video")?;

        let patch = VideoPatch {
            is_published: Some(!video.is_published),
            ..Default::default()
        };
        let updated = self
            .videos
            .update_by_id(&id, &patch)?
            .ok_or_else(|| ApiError::not_found("Video does not exist"))?;
        debug!("Video {} published={}", id, updated.is_published);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::mock_store::MockMediaRelay;
    use crate::media::public_id_from_url;
    use crate::model::Collection;
    use crate::store::mock_store::MockDocumentStore;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        store: Arc<MockDocumentStore>,
        relay: Arc<MockMediaRelay>,
        service: VideoService,
        dir: TempDir,
    }

    fn fixture_with(relay: MockMediaRelay) -> Fixture {
        let store = Arc::new(MockDocumentStore::new());
        let relay = Arc::new(relay);
        let media = Arc::new(MediaService::new(relay.clone()));
        Fixture {
            service: VideoService::new(store.clone(), media),
            store,
            relay,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MockMediaRelay::new())
    }

    impl Fixture {
        fn stage(&self, name: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            std::fs::write(&path, name.as_bytes()).unwrap();
            path
        }

        async fn publish(&self, user: &UserContext, title: &str) -> Video {
            let video = self.stage(&format!("{}.mp4", ObjectId::new()));
            let thumb = self.stage(&format!("{}.png", ObjectId::new()));
            self.service
                .publish_video(user, Some(title), Some("about"), Some(&video), Some(&thumb))
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_publish_uploads_both_files() {
        let f = fixture();
        let user = UserContext::new(ObjectId::new());
        let video_path = f.stage("clip.mp4");
        let thumb_path = f.stage("clip.png");

        let video = f
            .service
            .publish_video(&user, Some(" Launch "), Some("day one"), Some(&video_path), Some(&thumb_path))
            .await
            .unwrap();

        assert_eq!(video.title, "Launch");
        assert_eq!(video.owner, user.user_id);
        assert_eq!(video.duration, 12);
        assert!(video.is_published);
        assert!(video.video_file.contains("/video/upload/"));
        assert!(video.thumbnail.contains("/image/upload/"));
        assert_eq!(f.relay.object_count(), 2);
        assert!(!video_path.exists());
        assert!(!thumb_path.exists());
    }

    #[tokio::test]
    async fn test_publish_requires_every_field() {
        let f = fixture();
        let user = UserContext::new(ObjectId::new());
        let video_path = f.stage("clip.mp4");

        let missing_thumb = f
            .service
            .publish_video(&user, Some("t"), Some("d"), Some(&video_path), None)
            .await;
        assert!(matches!(missing_thumb, Err(ApiError::Validation(_))));

        let blank_title = f
            .service
            .publish_video(&user, Some("  "), Some("d"), Some(&video_path), Some(&video_path))
            .await;
        assert!(matches!(blank_title, Err(ApiError::Validation(_))));
        assert_eq!(f.relay.object_count(), 0);
        assert_eq!(f.store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_staged_file_is_internal_error() {
        let f = fixture();
        let user = UserContext::new(ObjectId::new());
        let absent = f.dir.path().join("never-written.mp4");
        let thumb = f.stage("t.png");

        let result = f
            .service
            .publish_video(&user, Some("t"), Some("d"), Some(&absent), Some(&thumb))
            .await;
        assert!(matches!(result, Err(ApiError::Internal(_))));
        assert_eq!(f.store.document_count(Collection::Videos), 0);
        assert_eq!(f.relay.object_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_thumbnail_upload_discards_video() {
        let f = fixture();
        let user = UserContext::new(ObjectId::new());
        let video_path = f.stage("clip.mp4");
        let absent_thumb = f.dir.path().join("absent.png");

        let result = f
            .service
            .publish_video(&user, Some("t"), Some("d"), Some(&video_path), Some(&absent_thumb))
            .await;
        assert!(result.is_err());
        assert_eq!(f.relay.object_count(), 0);
    }

    #[tokio::test]
    async fn test_unpublished_video_hidden_from_others() {
        let f = fixture();
        let owner = UserContext::new(ObjectId::new());
        let stranger = UserContext::new(ObjectId::new());
        let video = f.publish(&owner, "secret").await;

        let hidden = f.service.toggle_publish_status(&owner, &video.id.to_string()).unwrap();
        assert!(!hidden.is_published);

        assert!(f.service.get_video(&owner, &video.id.to_string()).is_ok());
        assert!(matches!(
            f.service.get_video(&stranger, &video.id.to_string()),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            f.service.toggle_publish_status(&stranger, &video.id.to_string()),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_sorts_and_pages() {
        let f = fixture();
        let alice = UserContext::new(ObjectId::new());
        let bob = UserContext::new(ObjectId::new());

        f.publish(&alice, "Banana bread").await;
        f.publish(&alice, "apple pie").await;
        let draft = f.publish(&alice, "Cherry draft").await;
        f.service.toggle_publish_status(&alice, &draft.id.to_string()).unwrap();
        f.publish(&bob, "Bob's banana split").await;

        let all = f.service.list_videos(&bob, &VideoQuery::default()).unwrap();
        assert_eq!(all.total_docs, 3);

        let by_title = VideoQuery {
            sort_by: Some("title".into()),
            sort_type: Some("asc".into()),
            ..Default::default()
        };
        let titles: Vec<String> = f
            .service
            .list_videos(&bob, &by_title)
            .unwrap()
            .docs
            .into_iter()
            .map(|v| v.title)
            .collect();
        assert_eq!(titles, vec!["apple pie", "Banana bread", "Bob's banana split"]);

        let search = VideoQuery { query: Some("BANANA".into()), ..Default::default() };
        assert_eq!(f.service.list_videos(&bob, &search).unwrap().total_docs, 2);

        let alice_channel = VideoQuery { user_id: Some(alice.user_id.to_string()), ..Default::default() };
        assert_eq!(f.service.list_videos(&alice, &alice_channel).unwrap().total_docs, 3);
        assert_eq!(f.service.list_videos(&bob, &alice_channel).unwrap().total_docs, 2);

        let paged = VideoQuery { page: Some(2), limit: Some(2), ..Default::default() };
        let page = f.service.list_videos(&bob, &paged).unwrap();
        assert_eq!(page.docs.len(), 1);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_list_rejects_bad_parameters_before_store_access() {
        let f = fixture();
        let user = UserContext::new(ObjectId::new());

        for query in [
            VideoQuery { sort_by: Some("likes".into()), ..Default::default() },
            VideoQuery { sort_type: Some("sideways".into()), ..Default::default() },
            VideoQuery { limit: Some(500), ..Default::default() },
            VideoQuery { user_id: Some("me".into()), ..Default::default() },
        ] {
            assert!(matches!(f.service.list_videos(&user, &query), Err(ApiError::Validation(_))));
        }
        assert_eq!(f.store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_replaces_thumbnail() {
        let f = fixture();
        let owner = UserContext::new(ObjectId::new());
        let video = f.publish(&owner, "first").await;
        let new_thumb = f.stage("fresh.png");

        let updated = f
            .service
            .update_video(&owner, &video.id.to_string(), Some("second"), Some("new"), Some(&new_thumb))
            .await
            .unwrap();

        assert_eq!(updated.title, "second");
        assert_ne!(updated.thumbnail, video.thumbnail);
        // Old thumbnail gone, new one hosted, video file untouched
        assert_eq!(f.relay.object_count(), 2);
        assert!(!new_thumb.exists());
    }

    #[tokio::test]
    async fn test_update_by_stranger_is_forbidden() {
        let f = fixture();
        let owner = UserContext::new(ObjectId::new());
        let video = f.publish(&owner, "mine").await;

        let result = f
            .service
            .update_video(&UserContext::new(ObjectId::new()), &video.id.to_string(), Some("x"), Some("y"), None)
            .await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_media_and_record() {
        let f = fixture();
        let owner = UserContext::new(ObjectId::new());
        let video = f.publish(&owner, "bye").await;

        let deleted = f.service.delete_video(&owner, &video.id.to_string()).await.unwrap();
        assert_eq!(deleted.id, video.id);
        assert_eq!(f.relay.object_count(), 0);
        assert!(matches!(
            f.service.delete_video(&owner, &video.id.to_string()).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_media_delete_keeps_record() {
        let f = fixture_with(MockMediaRelay::new().failing_destroys());
        let owner = UserContext::new(ObjectId::new());
        let video = f.publish(&owner, "sticky").await;

        let result = f.service.delete_video(&owner, &video.id.to_string()).await;
        assert!(matches!(result, Err(ApiError::Internal(_))));
        assert_eq!(f.store.document_count(Collection::Videos), 1);
    }

    #[tokio::test]
    async fn test_failed_thumbnail_delete_still_removes_video() {
        let f = fixture_with(MockMediaRelay::new().failing_destroys_of(ResourceKind::Image));
        let owner = UserContext::new(ObjectId::new());
        let video = f.publish(&owner, "half").await;
        let video_id = public_id_from_url(&video.video_file).unwrap();
        let thumb_id = public_id_from_url(&video.thumbnail).unwrap();

        let deleted = f.service.delete_video(&owner, &video.id.to_string()).await.unwrap();
        assert_eq!(deleted.id, video.id);
        assert_eq!(f.store.document_count(Collection::Videos), 0);
        assert!(!f.relay.contains(&video_id));
        assert!(f.relay.contains(&thumb_id));
    }

    #[tokio::test]
    async fn test_failed_video_file_delete_keeps_thumbnail_and_record() {
        let f = fixture_with(MockMediaRelay::new().failing_destroys_of(ResourceKind::Video));
        let owner = UserContext::new(ObjectId::new());
        let video = f.publish(&owner, "whole").await;

        let result = f.service.delete_video(&owner, &video.id.to_string()).await;
        assert!(matches!(result, Err(ApiError::Internal(_))));
        assert_eq!(f.store.document_count(Collection::Videos), 1);
        assert!(f.relay.contains(&public_id_from_url(&video.thumbnail).unwrap()));
        assert!(f.relay.contains(&public_id_from_url(&video.video_file).unwrap()));
    }
}
