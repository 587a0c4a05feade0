//! Service layer
//!
//! Each service validates its input before touching a backend, then checks
//! existence, then ownership, and only then mutates.

pub mod comment_service;
pub mod like_service;
pub mod media_service;
pub mod playlist_service;
pub mod tweet_service;
pub mod user_context;
pub mod video_service;

use log::warn;

use crate::error::ApiError;
use crate::model::ObjectId;
use crate::service::user_context::UserContext;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;

/// Fail with Forbidden unless `user` owns the entity
pub(crate) fn ensure_owner(user: &UserContext, owner: &ObjectId, what: &str) -> Result<(), ApiError> {
    if !user.owns(owner) {
        warn!("User {} tried to modify {} owned by {}", user.user_id, what, owner);
        return Err(ApiError::forbidden(format!("You are not the owner of this {}", what)));
    }
    Ok(())
}

/// Resolve optional paging parameters to a 1-based page and a bounded limit
pub fn resolve_page(page: Option<usize>, limit: Option<usize>) -> Result<(usize, usize), ApiError> {
    let page = page.unwrap_or(DEFAULT_PAGE);
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if page == 0 {
        return Err(ApiError::validation("page must be at least 1"));
    }
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ApiError::validation(format!("limit must be between 1 and {}", MAX_PAGE_LIMIT)));
    }
    Ok((page, limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_page() {
        assert_eq!(resolve_page(None, None).unwrap(), (1, 10));
        assert_eq!(resolve_page(Some(3), Some(100)).unwrap(), (3, 100));
        assert!(resolve_page(Some(0), None).is_err());
        assert!(resolve_page(None, Some(0)).is_err());
        assert!(resolve_page(None, Some(101)).is_err());
    }

    #[test]
    fn test_ensure_owner() {
        let owner = ObjectId::new();
        assert!(ensure_owner(&UserContext::new(owner), &owner, "video").is_ok());
        match ensure_owner(&UserContext::new(ObjectId::new()), &owner, "video") {
            Err(ApiError::Forbidden(message)) => assert!(message.contains("video")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
