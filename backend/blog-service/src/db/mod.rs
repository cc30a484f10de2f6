//! Entity store
//!
//! One repository trait per entity. `Store` bundles a full set of them, backed
//! either by PostgreSQL or by the in-process [`MemoryStore`].

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Comment, CommentDetails, FeedScope, Group, NewComment, NewGroup, NewPost, NewUser, Post,
    PostChanges, PostDetails, User,
};
use crate::pagination::{Page, Paginator, RequestedPage};

pub mod comment_repo;
pub mod follow_repo;
pub mod group_repo;
pub mod memory;
pub mod pool;
pub mod post_repo;
pub mod user_repo;

pub use comment_repo::PgCommentRepository;
pub use follow_repo::PgFollowRepository;
pub use group_repo::PgGroupRepository;
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, DbConfig};
pub use post_repo::PgPostRepository;
pub use user_repo::PgUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Removes the user together with their posts, comments and follow rows.
    async fn delete_user(&self, id: Uuid) -> Result<bool>;
}

/// Groups are managed by administrators; the web surface only reads them.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create_group(&self, group: NewGroup) -> Result<Group>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>>;

    /// All groups ordered by title
    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// Posts in the group survive with no group reference.
    async fn delete_group(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_post(&self, post: NewPost) -> Result<Post>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>>;

    async fn find_details(&self, id: i64) -> Result<Option<PostDetails>>;

    /// `created_at` and `author_id` never change.
    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Option<Post>>;

    /// Deletes the post and its comments.
    async fn delete_post(&self, id: i64) -> Result<bool>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<i64>;

    /// One page of posts in `scope`, newest first (`created_at DESC, id DESC`).
    ///
    /// The count and the slice come from a single consistent snapshot.
    async fn list_page(
        &self,
        scope: &FeedScope,
        paginator: &Paginator,
        requested: RequestedPage,
    ) -> Result<Page<PostDetails>>;

    /// Liveness probe for the backing store
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create_comment(&self, comment: NewComment) -> Result<Comment>;

    /// Comments on a post, newest first
    async fn list_by_post(&self, post_id: i64) -> Result<Vec<CommentDetails>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Returns false when the pair already existed.
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool>;

    /// Returns false when there was nothing to delete.
    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool>;

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool>;
}

/// A complete set of repositories
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Store {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            groups: Arc::new(PgGroupRepository::new(pool.clone())),
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            follows: Arc::new(PgFollowRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_memory(MemoryStore::new())
    }

    /// Wrap an existing memory store so callers can keep a handle for seeding.
    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            groups: Arc::new(store.clone()),
            posts: Arc::new(store.clone()),
            comments: Arc::new(store.clone()),
            follows: Arc::new(store),
        }
    }
}
