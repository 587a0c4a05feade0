use actix_web::{web, HttpResponse};

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::model::TargetKind;
use crate::response::ApiResponse;
use crate::service::user_context::UserContext;

fn toggle(kind: TargetKind, raw_id: &str, user: &UserContext, app_state: &AppState) -> Result<HttpResponse, ApiError> {
    let outcome = app_state.likes.toggle_like(user, kind, raw_id)?;
    let message = if outcome.is_added() {
        "Like added successfully"
    } else {
        "Like removed successfully"
    };
    Ok(ApiResponse::ok(outcome, message).into_response())
}

pub async fn toggle_video_like(
    path: web::Path<String>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    toggle(TargetKind::Video, &path, &user, &app_state)
}

pub async fn toggle_comment_like(
    path: web::Path<String>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    toggle(TargetKind::Comment, &path, &user, &app_state)
}

pub async fn toggle_tweet_like(
    path: web::Path<String>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    toggle(TargetKind::Tweet, &path, &user, &app_state)
}

pub async fn liked_videos(user: UserContext, app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let videos = app_state.likes.liked_videos(&user)?;
    Ok(ApiResponse::ok(videos, "Liked videos fetched successfully").into_response())
}
