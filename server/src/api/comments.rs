use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::service::user_context::UserContext;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// JSON body shared by comment and tweet writes
#[derive(Debug, Deserialize)]
pub struct ContentBody {
    pub content: Option<String>,
}

pub async fn list_video_comments(
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    _user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let page = app_state.comments.list_video_comments(&path, query.page, query.limit)?;
    Ok(ApiResponse::ok(page, "Comments fetched successfully").into_response())
}

pub async fn add_comment(
    path: web::Path<String>,
    body: web::Json<ContentBody>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let comment = app_state.comments.add_comment(&user, &path, body.content.as_deref())?;
    Ok(ApiResponse::ok(comment, "Comment added successfully").into_response())
}

pub async fn update_comment(
    path: web::Path<String>,
    body: web::Json<ContentBody>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let comment = app_state.comments.update_comment(&user, &path, body.content.as_deref())?;
    Ok(ApiResponse::ok(comment, "Comment updated successfully").into_response())
}

pub async fn delete_comment(
    path: web::Path<String>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let comment = app_state.comments.delete_comment(&user, &path)?;
    Ok(ApiResponse::ok(comment, "Comment deleted successfully").into_response())
}
