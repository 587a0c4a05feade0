use actix_web::{web, HttpResponse};

use crate::api::comments::ContentBody;
use crate::app_state::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::service::user_context::UserContext;

pub async fn create_tweet(
    body: web::Json<ContentBody>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let tweet = app_state.tweets.create_tweet(&user, body.content.as_deref())?;
    Ok(ApiResponse::ok(tweet, "Tweet created successfully").into_response())
}

pub async fn user_tweets(
    path: web::Path<String>,
    _user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let tweets = app_state.tweets.user_tweets(&path)?;
    Ok(ApiResponse::ok(tweets, "Tweets fetched successfully").into_response())
}

pub async fn update_tweet(
    path: web::Path<String>,
    body: web::Json<ContentBody>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let tweet = app_state.tweets.update_tweet(&user, &path, body.content.as_deref())?;
    Ok(ApiResponse::ok(tweet, "Tweet updated successfully").into_response())
}

pub async fn delete_tweet(
    path: web::Path<String>,
    user: UserContext,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let tweet = app_state.tweets.delete_tweet(&user, &path)?;
    Ok(ApiResponse::ok(tweet, "Tweet deleted successfully").into_response())
}
