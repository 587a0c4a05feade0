//! Short text posts

use log::info;
use std::sync::Arc;

use crate::error::ApiError;
use crate::model::{ContentPatch, ObjectId, Tweet};
use crate::service::ensure_owner;
use crate::service::user_context::UserContext;
use crate::store::repository::Repository;
use crate::store::{DocumentStore, Filter};
use crate::validation::{require_id, require_text};

pub struct TweetService {
    tweets: Repository<Tweet>,
}

impl TweetService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            tweets: Repository::new(store),
        }
    }

    fn find_tweet(&self, id: &ObjectId) -> Result<Tweet, ApiError> {
        self.tweets
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("Tweet does not exist"))
    }

    pub fn create_tweet(&self, user: &UserContext, content: Option<&str>) -> Result<Tweet, ApiError> {
        let content = require_text(content, "Content")?;
        let tweet = self.tweets.create(Tweet::new(user.user_id, content))?;
        info!("User {} posted tweet {}", user.user_id, tweet.id);
        Ok(tweet)
    }

    /// Tweets by one user, newest first
    pub fn user_tweets(&self, raw_user_id: &str) -> Result<Vec<Tweet>, ApiError> {
        let owner = require_id(raw_user_id, "user")?;
        let mut tweets = self.tweets.find(&Filter::new().eq("owner", owner))?;
        tweets.reverse();
        Ok(tweets)
    }

    pub fn update_tweet(&self, user: &UserContext, raw_id: &str, content: Option<&str>) -> Result<Tweet, ApiError> {
        let id = require_id(raw_id, "tweet")?;
        let content = require_text(content, "Content")?;

        let tweet = self.find_tweet(&id)?;
        ensure_owner(user, &tweet.owner, "tweet")?;

        self.tweets
            .update_by_id(&id, &ContentPatch { content })?
            .ok_or_else(|| ApiError::not_found("Tweet does not exist"))
    }

    pub fn delete_tweet(&self, user: &UserContext, raw_id: &str) -> Result<Tweet, ApiError> {
        let id = require_id(raw_id, "tweet")?;
        let tweet = self.find_tweet(&id)?;
        ensure_owner(user, &tweet.owner, "tweet")?;

        let deleted = self
            .tweets
            .delete_by_id(&id)?
            .ok_or_else(|| ApiError::not_found("Tweet does not exist"))?;
        info!("User {} deleted tweet {}", user.user_id, id);
        Ok(deleted)
    }
}
