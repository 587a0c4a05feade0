//! HTTP surface under `/api/v1`

pub mod comments;
pub mod likes;
pub mod media;
pub mod playlists;
pub mod tweets;
pub mod upload;
pub mod videos;

use actix_web::dev::Service;
use actix_web::{web, HttpResponse};
use log::warn;
use serde_json::json;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::service::user_context::{log_user, UserLogScope};

pub const API_PREFIX: &str = "/api/v1";

/// Register every route; body and query parse failures use the error envelope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        warn!("Rejected JSON body: {}", err);
        ApiError::validation(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        warn!("Rejected query string: {}", err);
        ApiError::validation(err.to_string()).into()
    }))
    .service(
        web::scope(API_PREFIX)
            .wrap_fn(|req, srv| UserLogScope::new(log_user(req.headers()), srv.call(req)))
            .route("/healthcheck", web::get().to(healthcheck))
            .service(
                web::scope("/videos")
                    .route("", web::get().to(videos::list_videos))
                    .route("", web::post().to(videos::publish_video))
                    .route("/toggle/publish/{videoId}", web::patch().to(videos::toggle_publish_status))
                    .route("/{videoId}", web::get().to(videos::get_video))
                    .route("/{videoId}", web::patch().to(videos::update_video))
                    .route("/{videoId}", web::delete().to(videos::delete_video)),
            )
            .service(
                web::scope("/comments")
                    .route("/c/{commentId}", web::patch().to(comments::update_comment))
                    .route("/c/{commentId}", web::delete().to(comments::delete_comment))
                    .route("/{videoId}", web::get().to(comments::list_video_comments))
                    .route("/{videoId}", web::post().to(comments::add_comment)),
            )
            .service(
                web::scope("/likes")
                    .route("/toggle/v/{videoId}", web::post().to(likes::toggle_video_like))
                    .route("/toggle/c/{commentId}", web::post().to(likes::toggle_comment_like))
                    .route("/toggle/t/{tweetId}", web::post().to(likes::toggle_tweet_like))
                    .route("/videos", web::get().to(likes::liked_videos)),
            )
            .service(
                web::scope("/tweets")
                    .route("", web::post().to(tweets::create_tweet))
                    .route("/user/{userId}", web::get().to(tweets::user_tweets))
                    .route("/{tweetId}", web::patch().to(tweets::update_tweet))
                    .route("/{tweetId}", web::delete().to(tweets::delete_tweet)),
            )
            .service(
                web::scope("/playlist")
                    .route("", web::post().to(playlists::create_playlist))
                    .route("/user/{userId}", web::get().to(playlists::user_playlists))
                    .route("/add/{videoId}/{playlistId}", web::patch().to(playlists::add_video))
                    .route("/remove/{videoId}/{playlistId}", web::patch().to(playlists::remove_video))
                    .route("/{playlistId}", web::get().to(playlists::get_playlist))
                    .route("/{playlistId}", web::patch().to(playlists::update_playlist))
                    .route("/{playlistId}", web::delete().to(playlists::delete_playlist)),
            ),
    )
    .route("/media/{file}", web::get().to(media::serve_local_media));
}

async fn healthcheck() -> HttpResponse {
    ApiResponse::ok(json!({ "status": "OK" }), "Server is healthy").into_response()
}
