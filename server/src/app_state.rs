//! Application State Management
//!
//! This module provides the application state that contains all services
//! and their dependencies, following the dependency injection pattern.

use log::info;
use std::sync::Arc;

use crate::config::{AppConfig, MediaBackend, StoreBackend};
use crate::media::cloudinary::CloudinaryRelay;
use crate::media::local_store::LocalMediaStore;
use crate::media::mock_store::MockMediaRelay;
use crate::media::{MediaError, MediaRelay};
use crate::service::comment_service::CommentService;
use crate::service::like_service::LikeService;
use crate::service::media_service::MediaService;
use crate::service::playlist_service::PlaylistService;
use crate::service::tweet_service::TweetService;
use crate::service::video_service::VideoService;
use crate::store::mock_store::MockDocumentStore;
use crate::store::sqlite_store::SQLiteDocumentStore;
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("cannot open document store: {0}")]
    Store(#[from] StoreError),
    #[error("cannot initialize media relay: {0}")]
    Media(#[from] MediaError),
}

/// Application state containing all services and their dependencies
#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<VideoService>,
    pub comments: Arc<CommentService>,
    pub likes: Arc<LikeService>,
    pub tweets: Arc<TweetService>,
    pub playlists: Arc<PlaylistService>,
    pub config: AppConfig,
}

impl AppState {
    /// Create application state from configuration
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        info!("Initializing application state with configuration");

        let store: Arc<dyn DocumentStore> = match config.store.backend {
            StoreBackend::SQLite => {
                info!(
                    "Using SQLite document store with db_path: {}, wal_mode: {}",
                    config.store.db_path, config.store.wal_mode
                );
                Arc::new(SQLiteDocumentStore::open(&config.store)?)
            }
            StoreBackend::Mock => {
                info!("Using mock document store");
                Arc::new(MockDocumentStore::new())
            }
        };

        let relay: Arc<dyn MediaRelay> = match config.media.backend {
            MediaBackend::Cloudinary => {
                info!("Using Cloudinary media relay for cloud: {}", config.media.cloud_name);
                Arc::new(CloudinaryRelay::new(&config.media)?)
            }
            MediaBackend::Local => {
                info!(
                    "Using local media store with base_path: {}, public_base_url: {}",
                    config.media.base_path, config.media.public_base_url
                );
                Arc::new(LocalMediaStore::new(&config.media)?)
            }
            MediaBackend::Mock => {
                info!("Using mock media relay");
                Arc::new(MockMediaRelay::new())
            }
        };

        let state = Self::with_backends(config, store, relay);
        info!("Application state initialized successfully");
        Ok(state)
    }

    /// Wire services around already constructed backends
    pub fn with_backends(config: AppConfig, store: Arc<dyn DocumentStore>, relay: Arc<dyn MediaRelay>) -> Self {
        let media = Arc::new(MediaService::new(relay));
        Self {
            videos: Arc::new(VideoService::new(Arc::clone(&store), media)),
            comments: Arc::new(CommentService::new(Arc::clone(&store))),
            likes: Arc::new(LikeService::new(Arc::clone(&store))),
            tweets: Arc::new(TweetService::new(Arc::clone(&store))),
            playlists: Arc::new(PlaylistService::new(store)),
            config,
        }
    }

    /// Create application state for testing with mock backends
    pub fn new_for_testing() -> Self {
        Self::with_backends(
            AppConfig::default(),
            Arc::new(MockDocumentStore::new()),
            Arc::new(MockMediaRelay::new()),
        )
    }
}
