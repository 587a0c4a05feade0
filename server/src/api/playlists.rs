use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::service::user_context::UserContext;

#[derive(Debug, Deserialize)]
pub struct PlaylistBody {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn create_playlist(
    body: web::Json<PlaylistBody>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let playlist = app_state
        .playlists
        .create_playlist(&user, body.name.as_deref(), body.description.as_deref())?;
    Ok(ApiResponse::ok(playlist, "Playlist created successfully").into_response())
}

pub async fn user_playlists(
    path: web::Path<String>,
    _user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let playlists = app_state.playlists.user_playlists(&path)?;
    Ok(ApiResponse::ok(playlists, "Playlists fetched successfully").into_response())
}

pub async fn get_playlist(
    path: web::Path<String>,
    _user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let playlist = app_state.playlists.get_playlist(&path)?;
    Ok(ApiResponse::ok(playlist, "Playlist fetched successfully").into_response())
}

/// Path is `{videoId}/{playlistId}`
pub async fn add_video(
    path: web::Path<(String, String)>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let (video_id, playlist_id) = path.into_inner();
    let playlist = app_state.playlists.add_video(&user, &playlist_id, &video_id)?;
    Ok(ApiResponse::ok(playlist, "Video added to playlist").into_response())
}

/// Path is `{videoId}/{playlistId}`
pub async fn remove_video(
    path: web::Path<(String, String)>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let (video_id, playlist_id) = path.into_inner();
    let playlist = app_state.playlists.remove_video(&user, &playlist_id, &video_id)?;
    Ok(ApiResponse::ok(playlist, "Video removed from playlist").into_response())
}

pub async fn update_playlist(
    path: web::Path<String>,
    body: web::Json<PlaylistBody>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let playlist = app_state.playlists.update_playlist(
        &user,
        &path,
        body.name.as_deref(),
        body.description.as_deref(),
    )?;
    Ok(ApiResponse::ok(playlist, "Playlist updated successfully").into_response())
}

pub async fn delete_playlist(
    path: web::Path<String>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let playlist = app_state.playlists.delete_playlist(&user, &path)?;
    Ok(ApiResponse::ok(playlist, "Playlist deleted successfully").into_response())
}
