/// Business logic layer for blog-service
///
/// This module provides:
/// - FeedService: global, group, profile and following feeds, post detail
/// - PostService: create, edit and delete with authorship enforcement
/// - CommentService: comments on posts
/// - FollowService: follow/unfollow subscriptions
pub mod comments;
pub mod feed;
pub mod follow;
pub mod posts;

pub use comments::{CommentOutcome, CommentService};
pub use feed::FeedService;
pub use follow::FollowService;
pub use posts::{EditOutcome, FormOutcome, PostService};
