/// Data models for blog-service
///
/// This module defines structures for:
/// - User: identity mirrored from the identity provider
/// - Group: administrator-managed communities posts may belong to
/// - Post: text posts with an optional group and image reference
/// - Comment: comments on posts
/// - FeedScope: which posts a listing covers
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub mod forms;
pub mod views;

pub use forms::{CommentForm, PostForm};
pub use views::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    /// "first last", or the username when both are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub id: Option<Uuid>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Fields an author may change on an existing post.
/// `image: None` keeps the stored reference.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// A post joined with its author and (optional) group, as listed in feeds.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PostDetails {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
    pub image: Option<String>,
    pub author_username: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
}

/// Characters of the text used as a post's title
pub const POST_TITLE_CHARS: usize = 30;

impl PostDetails {
    /// The first characters of the text, as shown in the page title
    pub fn title(&self) -> String {
        self.text.chars().take(POST_TITLE_CHARS).collect()
    }

    pub fn from_parts(post: &Post, author: &User, group: Option<&Group>) -> Self {
        Self {
            id: post.id,
            text: post.text.clone(),
            created_at: post.created_at,
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image.clone(),
            author_username: author.username.clone(),
            author_first_name: author.first_name.clone(),
            author_last_name: author.last_name.clone(),
            group_title: group.map(|g| g.title.clone()),
            group_slug: group.map(|g| g.slug.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: Uuid,
    pub text: String,
}

/// A comment joined with its author.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CommentDetails {
    pub id: i64,
    pub post_id: i64,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_username: String,
    pub author_first_name: String,
    pub author_last_name: String,
}

/// Which posts a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    All,
    Group(i64),
    Author(Uuid),
    /// Posts by any author the given user follows
    FollowedBy(Uuid),
}

impl FeedScope {
    pub fn group_id(&self) -> Option<i64> {
        match self {
            FeedScope::Group(id) => Some(*id),
            _ => None,
        }
    }

    pub fn author_id(&self) -> Option<Uuid> {
        match self {
            FeedScope::Author(id) => Some(*id),
            _ => None,
        }
    }

    pub fn follower_id(&self) -> Option<Uuid> {
        match self {
            FeedScope::FollowedBy(id) => Some(*id),
            _ => None,
        }
    }
}
