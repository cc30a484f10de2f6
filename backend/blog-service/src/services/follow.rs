use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::db::{FollowRepository, Store, UserRepository};
use crate::error::{AppError, Result};
use crate::metrics::feed::FOLLOW_EVENTS;
use crate::models::User;

/// Subscriptions between readers and authors.
///
/// Both operations are idempotent: following twice keeps one row, unfollowing
/// a non-followed author does nothing.
#[derive(Clone)]
pub struct FollowService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl FollowService {
    pub fn new(users: Arc<dyn UserRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { users, follows }
    }

    pub fn from_store(store: &Store) -> Self {
        Self::new(store.users.clone(), store.follows.clone())
    }

    async fn author(&self, username: &str) -> Result<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))
    }

    /// Returns true if a new subscription was created.
    pub async fn follow(&self, follower: &User, author_username: &str) -> Result<bool> {
        let author = self.author(author_username).await?;
        if author.id == follower.id {
            return Err(AppError::InvalidOperation(
                "You cannot follow yourself".to_string(),
            ));
        }

        let created = self.follows.create_follow(follower.id, author.id).await?;
        FOLLOW_EVENTS
            .with_label_values(&[if created { "created" } else { "existing" }])
            .inc();
        if created {
            info!(follower = %follower.username, author = %author.username, "Follow created");
        }
        Ok(created)
    }

    /// Returns true if a subscription was removed.
    pub async fn unfollow(&self, follower: &User, author_username: &str) -> Result<bool> {
        let author = self.author(author_username).await?;

        let removed = self.follows.delete_follow(follower.id, author.id).await?;
        FOLLOW_EVENTS
            .with_label_values(&[if removed { "removed" } else { "absent" }])
            .inc();
        if removed {
            info!(follower = %follower.username, author = %author.username, "Follow removed");
        }
        Ok(removed)
    }

    pub async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        if user_id == author_id {
            return Ok(false);
        }
        self.follows.is_following(user_id, author_id).await
    }
}
