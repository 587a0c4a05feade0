use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use log::debug;
use std::path::Path;

use crate::api::upload::StagedForm;
use crate::app_state::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::service::user_context::UserContext;
use crate::service::video_service::VideoQuery;

async fn stage_form(payload: Multipart, app_state: &AppState) -> Result<StagedForm, ApiError> {
    StagedForm::stage(
        payload,
        Path::new(&app_state.config.media.temp_path),
        app_state.config.server.max_payload_size,
    )
    .await
}

pub async fn list_videos(
    query: web::Query<VideoQuery>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let page = app_state.videos.list_videos(&user, &query)?;
    Ok(ApiResponse::ok(page, "Videos fetched successfully").into_response())
}

/// Multipart fields: title, description, videoFile, thumbnail
pub async fn publish_video(
    payload: Multipart,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let form = stage_form(payload, &app_state).await?;
    debug!("Publishing video for user {}", user.user_id);

    let video = app_state
        .videos
        .publish_video(
            &user,
            form.text("title"),
            form.text("description"),
            form.file("videoFile"),
            form.file("thumbnail"),
        )
        .await?;
    Ok(ApiResponse::ok(video, "Video published successfully").into_response())
}

pub async fn get_video(
    path: web::Path<String>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let video = app_state.videos.get_video(&user, &path)?;
    Ok(ApiResponse::ok(video, "Video fetched successfully").into_response())
}

/// Multipart fields: title, description and an optional thumbnail
pub async fn update_video(
    path: web::Path<String>,
    payload: Multipart,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let form = stage_form(payload, &app_state).await?;
    let video = app_state
        .videos
        .update_video(
            &user,
            &path,
            form.text("title"),
            form.text("description"),
            form.file("thumbnail"),
        )
        .await?;
    Ok(ApiResponse::ok(video, "Video updated successfully").into_response())
}

pub async fn delete_video(
    path: web::Path<String>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let video = app_state.videos.delete_video(&user, &path).await?;
    Ok(ApiResponse::ok(video, "Video deleted successfully").into_response())
}

pub async fn toggle_publish_status(
    path: web::Path<String>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let video = app_state.videos.toggle_publish_status(&user, &path)?;
    let message = if video.is_published { "Video published" } else { "Video unpublished" };
    Ok(ApiResponse::ok(video, message).into_response())
}
