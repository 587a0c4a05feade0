//! Authenticated user extracted from the request
//!
//! Authentication happens upstream; the gateway forwards the acting user's
//! id in the `User` header.

use actix_web::dev::Payload;
use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpRequest};
use log::warn;
use serde::{Deserialize, Serialize};
use std::future::{ready, Future, Ready};
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::ApiError;
use crate::model::ObjectId;

pub const USER_HEADER: &str = "User";

/// MDC key read by the `{X(user)}` log pattern
pub const LOG_USER_KEY: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: ObjectId,
}

impl UserContext {
    pub fn new(user_id: ObjectId) -> Self {
        Self { user_id }
    }

    pub fn owns(&self, owner: &ObjectId) -> bool {
        self.user_id == *owner
    }

    fn from_request_headers(req: &HttpRequest) -> Result<Self, ApiError> {
        let raw = req
            .headers()
            .get(USER_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized request".to_string()))?
            .to_str()
            .map_err(|_| ApiError::Unauthorized("Invalid user header".to_string()))?;

        let user_id = raw.trim().parse::<ObjectId>().map_err(|_| {
            warn!("Rejected malformed user header: {:?}", raw);
            ApiError::Unauthorized("Invalid user header".to_string())
        })?;

        Ok(Self::new(user_id))
    }
}

impl FromRequest for UserContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_request_headers(req))
    }
}

/// User id to tag log lines with, if the request carries a valid one
pub fn log_user(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(USER_HEADER)?.to_str().ok()?;
    raw.trim().parse::<ObjectId>().ok().map(|id| id.to_string())
}

/// Runs a request future with the `user` MDC entry set only while it is polled
///
/// Requests interleave on a worker thread, so the entry is set before every
/// poll and removed after it.
pub struct UserLogScope<F> {
    user: Option<String>,
    inner: Pin<Box<F>>,
}

impl<F: Future> UserLogScope<F> {
    pub fn new(user: Option<String>, inner: F) -> Self {
        Self { user, inner: Box::pin(inner) }
    }
}

impl<F: Future> Future for UserLogScope<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &self.user {
            Some(user) => {
                log_mdc::insert(LOG_USER_KEY, user.as_str());
            }
            None => {
                log_mdc::remove(LOG_USER_KEY);
            }
        }
        let poll = self.inner.as_mut().poll(cx);
        log_mdc::remove(LOG_USER_KEY);
        poll
    }
}
