//! In-process store
//!
//! Mirrors the PostgreSQL schema constraints: unique usernames and slugs,
//! one follow row per pair, SET NULL on group delete and cascades on post and
//! user delete. Every operation runs under a single lock acquisition, so a
//! page's count and slice always agree.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{
    Comment, CommentDetails, FeedScope, Group, NewComment, NewGroup, NewPost, NewUser, Post,
    PostChanges, PostDetails, User,
};
use crate::pagination::{Page, Paginator, RequestedPage};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    follows: HashMap<(Uuid, Uuid), DateTime<Utc>>,
    next_group_id: i64,
    next_post_id: i64,
    next_comment_id: i64,
}

impl MemoryState {
    fn details(&self, post: &Post) -> Option<PostDetails> {
        let author = self.users.get(&post.author_id)?;
        let group = post.group_id.and_then(|id| self.groups.get(&id));
        Some(PostDetails::from_parts(post, author, group))
    }

    fn in_scope(&self, post: &Post, scope: &FeedScope) -> bool {
        match scope {
            FeedScope::All => true,
            FeedScope::Group(id) => post.group_id == Some(*id),
            FeedScope::Author(id) => post.author_id == *id,
            FeedScope::FollowedBy(user_id) => {
                self.follows.contains_key(&(*user_id, post.author_id))
            }
        }
    }

    fn slug_taken(&self, slug: &str) -> bool {
        self.groups.values().any(|g| g.slug == slug)
    }
}

/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a post with an explicit publication time.
    pub async fn create_post_at(&self, post: NewPost, created_at: DateTime<Utc>) -> Result<Post> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&post.author_id) {
            return Err(AppError::NotFound(format!(
                "author {} does not exist",
                post.author_id
            )));
        }
        if let Some(group_id) = post.group_id {
            if !state.groups.contains_key(&group_id) {
                return Err(AppError::NotFound(format!(
                    "group {} does not exist",
                    group_id
                )));
            }
        }

        state.next_post_id += 1;
        let created = Post {
            id: state.next_post_id,
            text: post.text,
            created_at,
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image,
        };
        state.posts.insert(created.id, created.clone());
        Ok(created)
    }

    /// Number of follow rows for the pair (0 or 1).
    pub async fn follow_rows(&self, user_id: Uuid, author_id: Uuid) -> usize {
        let state = self.state.read().await;
        state
            .follows
            .keys()
            .filter(|(u, a)| *u == user_id && *a == author_id)
            .count()
    }

    pub async fn comment_count(&self) -> usize {
        self.state.read().await.comments.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(format!(
                "username '{}' is taken",
                user.username
            )));
        }

        let created = User {
            id: user.id.unwrap_or_else(Uuid::new_v4),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }

        state.posts.retain(|_, p| p.author_id != id);
        let MemoryState {
            posts, comments, ..
        } = &mut *state;
        comments.retain(|_, c| c.author_id != id && posts.contains_key(&c.post_id));
        state.follows.retain(|(u, a), _| *u != id && *a != id);
        Ok(true)
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create_group(&self, group: NewGroup) -> Result<Group> {
        let mut state = self.state.write().await;
        if state.slug_taken(&group.slug) {
            return Err(AppError::Conflict(format!(
                "group slug '{}' already exists",
                group.slug
            )));
        }

        state.next_group_id += 1;
        let created = Group {
            id: state.next_group_id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        state.groups.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>> {
        Ok(self.state.read().await.groups.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let state = self.state.read().await;
        Ok(state.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let state = self.state.read().await;
        let mut groups: Vec<Group> = state.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn delete_group(&self, id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.groups.remove(&id).is_none() {
            return Ok(false);
        }

        for post in state.posts.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, post: NewPost) -> Result<Post> {
        self.create_post_at(post, Utc::now()).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn find_details(&self, id: i64) -> Result<Option<PostDetails>> {
        let state = self.state.read().await;
        Ok(state.posts.get(&id).and_then(|post| state.details(post)))
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Option<Post>> {
        let mut state = self.state.write().await;
        if let Some(group_id) = changes.group_id {
            if !state.groups.contains_key(&group_id) {
                return Err(AppError::NotFound(format!(
                    "group {} does not exist",
                    group_id
                )));
            }
        }

        let Some(post) = state.posts.get_mut(&id) else {
            return Ok(None);
        };
        post.text = changes.text;
        post.group_id = changes.group_id;
        if changes.image.is_some() {
            post.image = changes.image;
        }
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.posts.remove(&id).is_none() {
            return Ok(false);
        }
        state.comments.retain(|_, c| c.post_id != id);
        Ok(true)
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .count() as i64)
    }

    async fn list_page(
        &self,
        scope: &FeedScope,
        paginator: &Paginator,
        requested: RequestedPage,
    ) -> Result<Page<PostDetails>> {
        let state = self.state.read().await;

        let mut posts: Vec<PostDetails> = state
            .posts
            .values()
            .filter(|p| state.in_scope(p, scope))
            .filter_map(|p| state.details(p))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(paginator.paginate(posts, requested))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, comment: NewComment) -> Result<Comment> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&comment.post_id) {
            return Err(AppError::NotFound(format!("post {}", comment.post_id)));
        }

        state.next_comment_id += 1;
        let created = Comment {
            id: state.next_comment_id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created_at: Utc::now(),
        };
        state.comments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<CommentDetails>> {
        let state = self.state.read().await;
        let mut comments: Vec<CommentDetails> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| {
                let author = state.users.get(&c.author_id)?;
                Some(CommentDetails {
                    id: c.id,
                    post_id: c.post_id,
                    author_id: c.author_id,
                    text: c.text.clone(),
                    created_at: c.created_at,
                    author_username: author.username.clone(),
                    author_first_name: author.first_name.clone(),
                    author_last_name: author.last_name.clone(),
                })
            })
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(comments)
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        if user_id == author_id {
            return Err(AppError::InvalidOperation(
                "users cannot follow themselves".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) || !state.users.contains_key(&author_id) {
            return Err(AppError::NotFound("user".to_string()));
        }
        if state.follows.contains_key(&(user_id, author_id)) {
            return Ok(false);
        }
        state.follows.insert((user_id, author_id), Utc::now());
        Ok(true)
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state.follows.remove(&(user_id, author_id)).is_some())
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.follows.contains_key(&(user_id, author_id)))
    }
}
